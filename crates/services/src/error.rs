//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::{
    ExamError, ExamId, QuestionError, ResultError, SessionError, SessionId, StudentError,
    UserError,
};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ExamSessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionFlowError {
    #[error("exam {0} not found")]
    ExamNotFound(ExamId),

    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    #[error("no result recorded for completed session {0}")]
    ResultNotFound(SessionId),

    #[error("session token mismatch")]
    InvalidToken,

    #[error("not authorized to start an exam")]
    NotAuthorized,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Result(#[from] ResultError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ExamService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamAdminError {
    #[error(transparent)]
    Exam(#[from] ExamError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuestionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionBankError {
    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StudentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RosterError {
    #[error(transparent)]
    Student(#[from] StudentError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by command dispatch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CommandError {
    #[error(transparent)]
    Session(#[from] SessionFlowError),

    #[error(transparent)]
    Exams(#[from] ExamAdminError),

    #[error(transparent)]
    Questions(#[from] QuestionBankError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}
