use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::auth_service::AuthService;
use crate::error::AppServicesError;
use crate::exam_service::ExamService;
use crate::question_service::QuestionService;
use crate::results_service::ResultsService;
use crate::sessions::ExamSessionService;
use crate::student_service::StudentService;

/// Fallback database URL when `EXAM_PORTAL_DB` is unset.
const DEFAULT_DB_URL: &str = "sqlite:exam_portal.db?mode=rwc";

/// Assembles the portal's services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    sessions: Arc<ExamSessionService>,
    exams: Arc<ExamService>,
    questions: Arc<QuestionService>,
    students: Arc<StudentService>,
    results: Arc<ResultsService>,
    auth: Arc<AuthService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the default
    /// admin bootstrap fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock).await
    }

    /// Build `SQLite`-backed services from the `EXAM_PORTAL_DB` environment
    /// variable, falling back to a local database file.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn sqlite_from_env(clock: Clock) -> Result<Self, AppServicesError> {
        let db_url =
            std::env::var("EXAM_PORTAL_DB").unwrap_or_else(|_| DEFAULT_DB_URL.to_string());
        Self::new_sqlite(&db_url, clock).await
    }

    /// Build services over the in-memory backend, for tests and
    /// prototyping.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the default admin bootstrap fails.
    pub async fn in_memory(clock: Clock) -> Result<Self, AppServicesError> {
        Self::from_storage(Storage::in_memory(), clock).await
    }

    /// Wire services over an already-built storage aggregate.
    ///
    /// Seeds the default admin account when the user store is empty.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the admin bootstrap fails.
    pub async fn from_storage(storage: Storage, clock: Clock) -> Result<Self, AppServicesError> {
        let auth = Arc::new(AuthService::new(Arc::clone(&storage.users)));
        auth.ensure_default_admin().await?;

        let sessions = Arc::new(ExamSessionService::new(
            clock,
            Arc::clone(&storage.exams),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.sessions),
            Arc::clone(&storage.results),
        ));
        let exams = Arc::new(ExamService::new(
            clock,
            Arc::clone(&storage.exams),
            Arc::clone(&storage.questions),
        ));
        let questions = Arc::new(QuestionService::new(Arc::clone(&storage.questions)));
        let students = Arc::new(StudentService::new(Arc::clone(&storage.students)));
        let results = Arc::new(ResultsService::new(Arc::clone(&storage.results)));

        Ok(Self {
            sessions,
            exams,
            questions,
            students,
            results,
            auth,
        })
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<ExamSessionService> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn exams(&self) -> Arc<ExamService> {
        Arc::clone(&self.exams)
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionService> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn students(&self) -> Arc<StudentService> {
        Arc::clone(&self.students)
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultsService> {
        Arc::clone(&self.results)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }
}
