use std::collections::HashMap;
use std::sync::Arc;

use exam_core::Clock;
use exam_core::grading::grade;
use exam_core::model::{
    ExamId, ExamResult, ExamSession, Question, QuestionId, ResultId, SessionId, SessionToken,
};
use storage::repository::{
    ExamRepository, QuestionRepository, ResultRepository, SessionRepository, StorageError,
};

use super::draw::draw_question_set;
use crate::error::SessionFlowError;

/// Orchestrates the exam-session lifecycle: start, progress autosave, and
/// idempotent submission.
///
/// A session is ACTIVE from creation until its one and only submission,
/// after which it is COMPLETED for good. Submitting a completed session
/// hands back the stored result instead of grading again.
#[derive(Clone)]
pub struct ExamSessionService {
    clock: Clock,
    exams: Arc<dyn ExamRepository>,
    questions: Arc<dyn QuestionRepository>,
    sessions: Arc<dyn SessionRepository>,
    results: Arc<dyn ResultRepository>,
}

impl ExamSessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        exams: Arc<dyn ExamRepository>,
        questions: Arc<dyn QuestionRepository>,
        sessions: Arc<dyn SessionRepository>,
        results: Arc<dyn ResultRepository>,
    ) -> Self {
        Self {
            clock,
            exams,
            questions,
            sessions,
            results,
        }
    }

    /// Start a session for one student: draw their question subset from the
    /// exam pool and persist the new session.
    ///
    /// An exam with an empty pool still yields a session; it will simply
    /// grade to a total of zero.
    ///
    /// # Errors
    ///
    /// Returns `SessionFlowError::ExamNotFound` if the exam id does not
    /// resolve, `SessionFlowError::NotAuthorized` if the store refuses the
    /// write, or `SessionFlowError::Storage` on other repository failures.
    pub async fn start_session(
        &self,
        exam_id: ExamId,
        student_name: &str,
        student_number: &str,
    ) -> Result<ExamSession, SessionFlowError> {
        let exam = self
            .exams
            .get_exam(exam_id)
            .await?
            .ok_or(SessionFlowError::ExamNotFound(exam_id))?;

        let mut rng = rand::rng();
        let question_ids =
            draw_question_set(exam.question_ids(), exam.questions_to_display(), &mut rng);

        let session = ExamSession::new(
            SessionId::new(),
            exam_id,
            student_name,
            student_number,
            SessionToken::new(),
            question_ids,
            self.clock.now(),
        )?;

        match self.sessions.insert_session(&session).await {
            Ok(()) => {}
            Err(StorageError::PermissionDenied) => return Err(SessionFlowError::NotAuthorized),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            session = %session.id(),
            exam = %exam_id,
            questions = session.question_ids().len(),
            "exam session started"
        );
        Ok(session)
    }

    /// The questions of a session, in the session's sampled order.
    ///
    /// Ids that have since been deleted from the bank are skipped, mirroring
    /// how grading treats them.
    ///
    /// # Errors
    ///
    /// Returns `SessionFlowError::SessionNotFound` or
    /// `SessionFlowError::InvalidToken` before touching the bank.
    pub async fn session_questions(
        &self,
        session_id: SessionId,
        token: SessionToken,
    ) -> Result<Vec<Question>, SessionFlowError> {
        let session = self.fetch_session(session_id, token).await?;

        let bank = self.questions.list_questions().await?;
        let mut by_id: HashMap<QuestionId, Question> =
            bank.into_iter().map(|q| (q.id(), q)).collect();

        Ok(session
            .question_ids()
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect())
    }

    /// Autosave a student's in-progress answers and bookmark.
    ///
    /// # Errors
    ///
    /// Returns `SessionFlowError::SessionNotFound` or
    /// `SessionFlowError::InvalidToken` for a bad request, and a
    /// `SessionError::AlreadyCompleted` (wrapped) once the session is
    /// terminal.
    pub async fn save_progress(
        &self,
        session_id: SessionId,
        token: SessionToken,
        answers: HashMap<QuestionId, String>,
        current_question_index: usize,
    ) -> Result<(), SessionFlowError> {
        let mut session = self.fetch_session(session_id, token).await?;
        session.save_progress(answers, current_question_index)?;
        self.sessions.update_session(&session).await?;
        Ok(())
    }

    /// Submit a session's answers and return the graded result.
    ///
    /// Idempotent: once a session has completed, every further submission
    /// returns the stored result untouched, whatever answers it carries.
    /// The completion check is read-before-write; two racing submissions of
    /// the same session are not serialized here.
    ///
    /// # Errors
    ///
    /// Returns `SessionFlowError::SessionNotFound` /
    /// `SessionFlowError::ExamNotFound` when either record has vanished,
    /// `SessionFlowError::InvalidToken` for a token mismatch,
    /// `SessionFlowError::ResultNotFound` if a completed session has no
    /// stored result, or `SessionFlowError::Storage` on repository failures.
    pub async fn submit(
        &self,
        session_id: SessionId,
        token: SessionToken,
        answers: HashMap<QuestionId, String>,
    ) -> Result<ExamResult, SessionFlowError> {
        let mut session = self.fetch_session(session_id, token).await?;

        if session.is_completed() {
            tracing::debug!(session = %session_id, "duplicate submission, returning stored result");
            return self
                .results
                .result_for_session(session_id)
                .await?
                .ok_or(SessionFlowError::ResultNotFound(session_id));
        }

        let exam = self
            .exams
            .get_exam(session.exam_id())
            .await?
            .ok_or(SessionFlowError::ExamNotFound(session.exam_id()))?;

        // legacy sessions carry no sampled subset; grade the whole pool then
        let question_ids: Vec<QuestionId> = if session.question_ids().is_empty() {
            exam.question_ids().to_vec()
        } else {
            session.question_ids().to_vec()
        };

        let bank = self.questions.list_questions().await?;
        let by_id: HashMap<QuestionId, Question> =
            bank.into_iter().map(|q| (q.id(), q)).collect();

        let graded = grade(&question_ids, &by_id, &answers, exam.passing_score());
        let now = self.clock.now();

        session.complete(answers.clone(), now)?;
        self.sessions.update_session(&session).await?;

        let result = ExamResult::from_submission(
            ResultId::new(),
            &session,
            exam.id(),
            graded,
            answers,
            now,
        );
        self.results.insert_result(&result).await?;

        tracing::info!(
            session = %session_id,
            score = result.score(),
            total = result.total_points(),
            percentage = result.percentage(),
            passed = result.passed(),
            "exam session graded"
        );
        Ok(result)
    }

    /// Time left on the exam clock for a session.
    ///
    /// Counts down from the exam's duration starting at `started_at`,
    /// clamped at zero once the deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns `SessionFlowError::SessionNotFound`,
    /// `SessionFlowError::InvalidToken`, or `SessionFlowError::ExamNotFound`.
    pub async fn time_remaining(
        &self,
        session_id: SessionId,
        token: SessionToken,
    ) -> Result<chrono::Duration, SessionFlowError> {
        let session = self.fetch_session(session_id, token).await?;
        let exam = self
            .exams
            .get_exam(session.exam_id())
            .await?
            .ok_or(SessionFlowError::ExamNotFound(session.exam_id()))?;

        let deadline =
            session.started_at() + chrono::Duration::minutes(i64::from(exam.duration_mins()));
        Ok((deadline - self.clock.now()).max(chrono::Duration::zero()))
    }

    async fn fetch_session(
        &self,
        session_id: SessionId,
        token: SessionToken,
    ) -> Result<ExamSession, SessionFlowError> {
        let session = self
            .sessions
            .get_session(session_id)
            .await?
            .ok_or(SessionFlowError::SessionNotFound(session_id))?;
        if !session.token_matches(token) {
            return Err(SessionFlowError::InvalidToken);
        }
        Ok(session)
    }
}
