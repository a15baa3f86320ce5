use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use exam_core::model::{
    AdminUser, Exam, ExamId, ExamResult, ExamSession, Question, QuestionId, ResultId, SessionId,
    Student, StudentId, UserId,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("permission denied")]
    PermissionDenied,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the question bank.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist a new question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is taken, or other storage
    /// errors.
    async fn insert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// Persist a batch of new questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any insert fails.
    async fn insert_questions(&self, questions: &[Question]) -> Result<(), StorageError>;

    /// Fetch a question by id; `None` if missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// List the whole question bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError>;

    /// Delete a question; deleting a missing id is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError>;

    /// Delete a batch of questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn delete_questions(&self, ids: &[QuestionId]) -> Result<(), StorageError>;
}

/// Repository contract for exam definitions.
#[async_trait]
pub trait ExamRepository: Send + Sync {
    /// Persist a new exam.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is taken, or other storage
    /// errors.
    async fn insert_exam(&self, exam: &Exam) -> Result<(), StorageError>;

    /// Fetch an exam by id; `None` if missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_exam(&self, id: ExamId) -> Result<Option<Exam>, StorageError>;

    /// List exams, optionally restricted to one class level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_exams(&self, class_level: Option<&str>) -> Result<Vec<Exam>, StorageError>;

    /// Overwrite an existing exam.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the exam does not exist, or other
    /// storage errors.
    async fn update_exam(&self, exam: &Exam) -> Result<(), StorageError>;

    /// Delete an exam; deleting a missing id is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn delete_exam(&self, id: ExamId) -> Result<(), StorageError>;
}

/// Repository contract for exam sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is taken,
    /// `StorageError::PermissionDenied` if the backend refuses the write, or
    /// other storage errors.
    async fn insert_session(&self, session: &ExamSession) -> Result<(), StorageError>;

    /// Fetch a session by id; `None` if missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_session(&self, id: SessionId) -> Result<Option<ExamSession>, StorageError>;

    /// Overwrite an existing session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session does not exist, or
    /// other storage errors.
    async fn update_session(&self, session: &ExamSession) -> Result<(), StorageError>;
}

/// Repository contract for graded results.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Persist a new result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is taken, or other storage
    /// errors.
    async fn insert_result(&self, result: &ExamResult) -> Result<(), StorageError>;

    /// Fetch a result by id; `None` if missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_result(&self, id: ResultId) -> Result<Option<ExamResult>, StorageError>;

    /// List every stored result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_results(&self) -> Result<Vec<ExamResult>, StorageError>;

    /// The result recorded for a session, if any.
    ///
    /// This is the duplicate-submission lookup: a completed session's
    /// stored result is returned instead of regrading.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn result_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<ExamResult>, StorageError>;
}

/// Repository contract for the student roster.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Persist a new roster entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is taken, or other storage
    /// errors.
    async fn insert_student(&self, student: &Student) -> Result<(), StorageError>;

    /// Persist a batch of new roster entries.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any insert fails.
    async fn insert_students(&self, students: &[Student]) -> Result<(), StorageError>;

    /// List the whole roster.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_students(&self) -> Result<Vec<Student>, StorageError>;

    /// Overwrite an existing roster entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the student does not exist, or
    /// other storage errors.
    async fn update_student(&self, student: &Student) -> Result<(), StorageError>;

    /// Delete a roster entry; deleting a missing id is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn delete_student(&self, id: StudentId) -> Result<(), StorageError>;
}

/// Repository contract for admin accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new admin account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id or username is taken, or
    /// other storage errors.
    async fn insert_user(&self, user: &AdminUser) -> Result<(), StorageError>;

    /// Look up an account by exact username; `None` if missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminUser>, StorageError>;

    /// Number of stored admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn count_users(&self) -> Result<u64, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<HashMap<QuestionId, Question>>>,
    exams: Arc<Mutex<HashMap<ExamId, Exam>>>,
    sessions: Arc<Mutex<HashMap<SessionId, ExamSession>>>,
    results: Arc<Mutex<HashMap<ResultId, ExamResult>>>,
    students: Arc<Mutex<HashMap<StudentId, Student>>>,
    users: Arc<Mutex<HashMap<UserId, AdminUser>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(&question.id()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(question.id(), question.clone());
        Ok(())
    }

    async fn insert_questions(&self, questions: &[Question]) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if questions.iter().any(|q| guard.contains_key(&q.id())) {
            return Err(StorageError::Conflict);
        }
        for question in questions {
            guard.insert(question.id(), question.clone());
        }
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.values().cloned().collect())
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&id);
        Ok(())
    }

    async fn delete_questions(&self, ids: &[QuestionId]) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for id in ids {
            guard.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl ExamRepository for InMemoryRepository {
    async fn insert_exam(&self, exam: &Exam) -> Result<(), StorageError> {
        let mut guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(&exam.id()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(exam.id(), exam.clone());
        Ok(())
    }

    async fn get_exam(&self, id: ExamId) -> Result<Option<Exam>, StorageError> {
        let guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_exams(&self, class_level: Option<&str>) -> Result<Vec<Exam>, StorageError> {
        let guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .values()
            .filter(|exam| class_level.is_none_or(|level| exam.class_level() == level))
            .cloned()
            .collect())
    }

    async fn update_exam(&self, exam: &Exam) -> Result<(), StorageError> {
        let mut guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if !guard.contains_key(&exam.id()) {
            return Err(StorageError::NotFound);
        }
        guard.insert(exam.id(), exam.clone());
        Ok(())
    }

    async fn delete_exam(&self, id: ExamId) -> Result<(), StorageError> {
        let mut guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn insert_session(&self, session: &ExamSession) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(&session.id()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(session.id(), session.clone());
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<ExamSession>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn update_session(&self, session: &ExamSession) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if !guard.contains_key(&session.id()) {
            return Err(StorageError::NotFound);
        }
        guard.insert(session.id(), session.clone());
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn insert_result(&self, result: &ExamResult) -> Result<(), StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(&result.id()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(result.id(), result.clone());
        Ok(())
    }

    async fn get_result(&self, id: ResultId) -> Result<Option<ExamResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_results(&self) -> Result<Vec<ExamResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.values().cloned().collect())
    }

    async fn result_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<ExamResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .values()
            .find(|result| result.session_id() == session_id)
            .cloned())
    }
}

#[async_trait]
impl StudentRepository for InMemoryRepository {
    async fn insert_student(&self, student: &Student) -> Result<(), StorageError> {
        let mut guard = self
            .students
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(&student.id()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(student.id(), student.clone());
        Ok(())
    }

    async fn insert_students(&self, students: &[Student]) -> Result<(), StorageError> {
        let mut guard = self
            .students
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if students.iter().any(|s| guard.contains_key(&s.id())) {
            return Err(StorageError::Conflict);
        }
        for student in students {
            guard.insert(student.id(), student.clone());
        }
        Ok(())
    }

    async fn list_students(&self) -> Result<Vec<Student>, StorageError> {
        let guard = self
            .students
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.values().cloned().collect())
    }

    async fn update_student(&self, student: &Student) -> Result<(), StorageError> {
        let mut guard = self
            .students
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if !guard.contains_key(&student.id()) {
            return Err(StorageError::NotFound);
        }
        guard.insert(student.id(), student.clone());
        Ok(())
    }

    async fn delete_student(&self, id: StudentId) -> Result<(), StorageError> {
        let mut guard = self
            .students
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, user: &AdminUser) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(&user.id())
            || guard.values().any(|u| u.username() == user.username())
        {
            return Err(StorageError::Conflict);
        }
        guard.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminUser>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn count_users(&self) -> Result<u64, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.len() as u64)
    }
}

/// Aggregates the portal's repositories behind trait objects so backends can
/// be swapped wholesale.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub exams: Arc<dyn ExamRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            questions: Arc::new(repo.clone()),
            exams: Arc::new(repo.clone()),
            sessions: Arc::new(repo.clone()),
            results: Arc::new(repo.clone()),
            students: Arc::new(repo.clone()),
            users: Arc::new(repo),
        }
    }
}
