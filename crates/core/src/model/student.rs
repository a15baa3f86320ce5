use serde::Serialize;
use thiserror::Error;

use crate::model::ids::StudentId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StudentError {
    #[error("student name cannot be empty")]
    EmptyName,

    #[error("student number cannot be empty")]
    EmptyStudentNumber,

    #[error("class level cannot be empty")]
    EmptyClassLevel,
}

/// A roster entry for one enrolled student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    id: StudentId,
    name: String,
    student_number: String,
    class_level: String,
    sex: Option<String>,
}

impl Student {
    /// Creates a new roster entry.
    ///
    /// # Errors
    ///
    /// Returns `StudentError` if the name, number, or class level is empty.
    pub fn new(
        id: StudentId,
        name: impl Into<String>,
        student_number: impl Into<String>,
        class_level: impl Into<String>,
        sex: Option<String>,
    ) -> Result<Self, StudentError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StudentError::EmptyName);
        }
        let student_number = student_number.into();
        if student_number.trim().is_empty() {
            return Err(StudentError::EmptyStudentNumber);
        }
        let class_level = class_level.into();
        if class_level.trim().is_empty() {
            return Err(StudentError::EmptyClassLevel);
        }

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            student_number: student_number.trim().to_owned(),
            class_level: class_level.trim().to_owned(),
            sex: sex.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty()),
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> StudentId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn student_number(&self) -> &str {
        &self.student_number
    }

    #[must_use]
    pub fn class_level(&self) -> &str {
        &self.class_level
    }

    #[must_use]
    pub fn sex(&self) -> Option<&str> {
        self.sex.as_deref()
    }

    /// Login match on (name, student number), trimmed and case-insensitive.
    #[must_use]
    pub fn matches_login(&self, name: &str, student_number: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
            && self.student_number.to_lowercase() == student_number.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_student() -> Student {
        Student::new(StudentId::new(), "Ada Obi", "STU-001", "JSS1", None).unwrap()
    }

    #[test]
    fn login_match_is_forgiving_about_case_and_spacing() {
        let student = build_student();
        assert!(student.matches_login("ada obi", "stu-001"));
        assert!(student.matches_login("  Ada Obi  ", " STU-001 "));
        assert!(!student.matches_login("Ada Obi", "STU-002"));
        assert!(!student.matches_login("Ngozi Eze", "STU-001"));
    }

    #[test]
    fn rejects_blank_fields() {
        let err = Student::new(StudentId::new(), "", "STU-001", "JSS1", None).unwrap_err();
        assert_eq!(err, StudentError::EmptyName);

        let err = Student::new(StudentId::new(), "Ada Obi", " ", "JSS1", None).unwrap_err();
        assert_eq!(err, StudentError::EmptyStudentNumber);

        let err = Student::new(StudentId::new(), "Ada Obi", "STU-001", "", None).unwrap_err();
        assert_eq!(err, StudentError::EmptyClassLevel);
    }

    #[test]
    fn blank_sex_is_dropped() {
        let student =
            Student::new(StudentId::new(), "Ada Obi", "STU-001", "JSS1", Some("  ".into()))
                .unwrap();
        assert_eq!(student.sex(), None);
    }
}
