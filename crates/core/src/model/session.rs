use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::model::ids::{ExamId, QuestionId, SessionId, SessionToken};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("student name cannot be empty")]
    EmptyStudentName,

    #[error("student number cannot be empty")]
    EmptyStudentNumber,

    #[error("session is already completed")]
    AlreadyCompleted,

    #[error("ended_at is before started_at")]
    InvalidTimeRange,
}

/// One student's single attempt at an exam.
///
/// Owns the sampled question order drawn for this attempt; the order never
/// changes after creation. The session moves from active to completed exactly
/// once — there is no way back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamSession {
    id: SessionId,
    exam_id: ExamId,
    student_name: String,
    student_number: String,
    token: SessionToken,
    question_ids: Vec<QuestionId>,
    answers: HashMap<QuestionId, String>,
    current_question_index: usize,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    is_completed: bool,
}

impl ExamSession {
    /// Creates a new, active session with an empty answer map.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the student name or number is empty.
    pub fn new(
        id: SessionId,
        exam_id: ExamId,
        student_name: impl Into<String>,
        student_number: impl Into<String>,
        token: SessionToken,
        question_ids: Vec<QuestionId>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let student_name = student_name.into();
        if student_name.trim().is_empty() {
            return Err(SessionError::EmptyStudentName);
        }
        let student_number = student_number.into();
        if student_number.trim().is_empty() {
            return Err(SessionError::EmptyStudentNumber);
        }

        Ok(Self {
            id,
            exam_id,
            student_name: student_name.trim().to_owned(),
            student_number: student_number.trim().to_owned(),
            token,
            question_ids,
            answers: HashMap::new(),
            current_question_index: 0,
            started_at,
            ended_at: None,
            is_completed: false,
        })
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the stored fields fail validation or the
    /// timestamps are out of order.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SessionId,
        exam_id: ExamId,
        student_name: String,
        student_number: String,
        token: SessionToken,
        question_ids: Vec<QuestionId>,
        answers: HashMap<QuestionId, String>,
        current_question_index: usize,
        started_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
        is_completed: bool,
    ) -> Result<Self, SessionError> {
        if let Some(ended) = ended_at {
            if ended < started_at {
                return Err(SessionError::InvalidTimeRange);
            }
        }

        let mut session = Self::new(
            id,
            exam_id,
            student_name,
            student_number,
            token,
            question_ids,
            started_at,
        )?;
        session.answers = answers;
        session.current_question_index = current_question_index;
        session.ended_at = ended_at;
        session.is_completed = is_completed;
        Ok(session)
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn exam_id(&self) -> ExamId {
        self.exam_id
    }

    #[must_use]
    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    #[must_use]
    pub fn student_number(&self) -> &str {
        &self.student_number
    }

    #[must_use]
    pub fn token(&self) -> SessionToken {
        self.token
    }

    /// The sampled, ordered question subset shown to this student.
    #[must_use]
    pub fn question_ids(&self) -> &[QuestionId] {
        &self.question_ids
    }

    #[must_use]
    pub fn answers(&self) -> &HashMap<QuestionId, String> {
        &self.answers
    }

    /// UI bookmark only; grading never reads it.
    #[must_use]
    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Whether a presented token matches the one issued at creation.
    #[must_use]
    pub fn token_matches(&self, presented: SessionToken) -> bool {
        self.token == presented
    }

    /// Overwrite the stored answers and bookmark on an active session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyCompleted` once the session is terminal.
    pub fn save_progress(
        &mut self,
        answers: HashMap<QuestionId, String>,
        current_question_index: usize,
    ) -> Result<(), SessionError> {
        if self.is_completed {
            return Err(SessionError::AlreadyCompleted);
        }
        self.answers = answers;
        self.current_question_index = current_question_index;
        Ok(())
    }

    /// Mark the session completed, storing the final answers.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyCompleted` if the session is already
    /// terminal, or `SessionError::InvalidTimeRange` if `ended_at` precedes
    /// the start.
    pub fn complete(
        &mut self,
        answers: HashMap<QuestionId, String>,
        ended_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.is_completed {
            return Err(SessionError::AlreadyCompleted);
        }
        if ended_at < self.started_at {
            return Err(SessionError::InvalidTimeRange);
        }
        self.answers = answers;
        self.ended_at = Some(ended_at);
        self.is_completed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn build_session() -> ExamSession {
        ExamSession::new(
            SessionId::new(),
            ExamId::new(),
            "Ada Obi",
            "STU-001",
            SessionToken::new(),
            vec![QuestionId::new(), QuestionId::new()],
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn new_session_starts_active_and_empty() {
        let session = build_session();
        assert!(!session.is_completed());
        assert!(session.answers().is_empty());
        assert_eq!(session.current_question_index(), 0);
        assert_eq!(session.ended_at(), None);
    }

    #[test]
    fn rejects_blank_student_fields() {
        let err = ExamSession::new(
            SessionId::new(),
            ExamId::new(),
            " ",
            "STU-001",
            SessionToken::new(),
            Vec::new(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, SessionError::EmptyStudentName);
    }

    #[test]
    fn save_progress_then_complete() {
        let mut session = build_session();
        let question = session.question_ids()[0];

        let mut partial = HashMap::new();
        partial.insert(question, "Paris".to_string());
        session.save_progress(partial.clone(), 1).unwrap();
        assert_eq!(session.current_question_index(), 1);

        session
            .complete(partial, fixed_now() + Duration::minutes(5))
            .unwrap();
        assert!(session.is_completed());
        assert!(session.ended_at().is_some());
    }

    #[test]
    fn complete_is_terminal() {
        let mut session = build_session();
        session.complete(HashMap::new(), fixed_now()).unwrap();

        let err = session
            .complete(HashMap::new(), fixed_now())
            .unwrap_err();
        assert_eq!(err, SessionError::AlreadyCompleted);

        let err = session.save_progress(HashMap::new(), 0).unwrap_err();
        assert_eq!(err, SessionError::AlreadyCompleted);
    }

    #[test]
    fn complete_rejects_backwards_clock() {
        let mut session = build_session();
        let err = session
            .complete(HashMap::new(), fixed_now() - Duration::seconds(1))
            .unwrap_err();
        assert_eq!(err, SessionError::InvalidTimeRange);
    }

    #[test]
    fn token_matches_only_its_own() {
        let session = build_session();
        assert!(session.token_matches(session.token()));
        assert!(!session.token_matches(SessionToken::new()));
    }
}
