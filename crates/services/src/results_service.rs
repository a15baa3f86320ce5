use std::sync::Arc;

use exam_core::model::{ExamResult, ResultId, SessionId};
use storage::repository::ResultRepository;

use crate::error::SessionFlowError;

/// Read access to graded results for admin reporting views.
#[derive(Clone)]
pub struct ResultsService {
    results: Arc<dyn ResultRepository>,
}

impl ResultsService {
    #[must_use]
    pub fn new(results: Arc<dyn ResultRepository>) -> Self {
        Self { results }
    }

    /// Every stored result.
    ///
    /// # Errors
    ///
    /// Returns `SessionFlowError::Storage` on repository failures.
    pub async fn list_results(&self) -> Result<Vec<ExamResult>, SessionFlowError> {
        Ok(self.results.list_results().await?)
    }

    /// Fetch a result by id; `None` if missing.
    ///
    /// # Errors
    ///
    /// Returns `SessionFlowError::Storage` on repository failures.
    pub async fn get_result(&self, id: ResultId) -> Result<Option<ExamResult>, SessionFlowError> {
        Ok(self.results.get_result(id).await?)
    }

    /// The result recorded for a session, if it has one.
    ///
    /// # Errors
    ///
    /// Returns `SessionFlowError::Storage` on repository failures.
    pub async fn result_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<ExamResult>, SessionFlowError> {
        Ok(self.results.result_for_session(session_id).await?)
    }
}
