use std::sync::Arc;

use exam_core::model::{Student, StudentId};
use storage::repository::StudentRepository;

use crate::error::RosterError;

/// Admin-supplied fields for a new roster entry.
#[derive(Debug, Clone)]
pub struct StudentDraft {
    pub name: String,
    pub student_number: String,
    pub class_level: String,
    pub sex: Option<String>,
}

/// Student-roster maintenance and the student login check.
#[derive(Clone)]
pub struct StudentService {
    students: Arc<dyn StudentRepository>,
}

impl StudentService {
    #[must_use]
    pub fn new(students: Arc<dyn StudentRepository>) -> Self {
        Self { students }
    }

    /// Enroll one student.
    ///
    /// # Errors
    ///
    /// Returns `RosterError` if the draft fails validation or storage fails.
    pub async fn add_student(&self, draft: StudentDraft) -> Result<Student, RosterError> {
        let student = build_student(draft)?;
        self.students.insert_student(&student).await?;
        Ok(student)
    }

    /// Enroll a batch of students; nothing is stored if any draft is
    /// invalid.
    ///
    /// # Errors
    ///
    /// Returns `RosterError` if a draft fails validation or storage fails.
    pub async fn add_students(
        &self,
        drafts: Vec<StudentDraft>,
    ) -> Result<Vec<Student>, RosterError> {
        let students = drafts
            .into_iter()
            .map(build_student)
            .collect::<Result<Vec<_>, _>>()?;
        self.students.insert_students(&students).await?;
        tracing::info!(count = students.len(), "students enrolled");
        Ok(students)
    }

    /// List the whole roster.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` on repository failures.
    pub async fn list_students(&self) -> Result<Vec<Student>, RosterError> {
        Ok(self.students.list_students().await?)
    }

    /// Overwrite an existing roster entry.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` (`NotFound`) if the student does not
    /// exist.
    pub async fn update_student(&self, student: &Student) -> Result<(), RosterError> {
        Ok(self.students.update_student(student).await?)
    }

    /// Remove a roster entry.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` on repository failures.
    pub async fn remove_student(&self, id: StudentId) -> Result<(), RosterError> {
        Ok(self.students.delete_student(id).await?)
    }

    /// Look up the roster entry matching a login attempt, if any.
    ///
    /// The match is trimmed and case-insensitive on both the name and the
    /// student number; `None` means the credentials fit nobody.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` on repository failures.
    pub async fn student_login(
        &self,
        name: &str,
        student_number: &str,
    ) -> Result<Option<Student>, RosterError> {
        let roster = self.students.list_students().await?;
        Ok(roster
            .into_iter()
            .find(|s| s.matches_login(name, student_number)))
    }
}

fn build_student(draft: StudentDraft) -> Result<Student, RosterError> {
    Ok(Student::new(
        StudentId::new(),
        draft.name,
        draft.student_number,
        draft.class_level,
        draft.sex,
    )?)
}
