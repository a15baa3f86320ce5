use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::grading::GradedSubmission;
use crate::model::ids::{ExamId, QuestionId, ResultId, SessionId};
use crate::model::session::ExamSession;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultError {
    #[error("score {score} exceeds total points {total}")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("percentage must be between 0 and 100, got {0}")]
    InvalidPercentage(u8),
}

/// Immutable graded outcome of a completed session.
///
/// Derived from the session at submission time but independent of it
/// afterwards: later mutation of the session record never changes a
/// persisted result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamResult {
    id: ResultId,
    session_id: SessionId,
    exam_id: ExamId,
    student_name: String,
    student_number: String,
    score: u32,
    total_points: u32,
    percentage: u8,
    passed: bool,
    answers: HashMap<QuestionId, String>,
    correct: HashMap<QuestionId, bool>,
    completed_at: DateTime<Utc>,
}

impl ExamResult {
    /// Build a result from a graded submission.
    ///
    /// Infallible: `GradedSubmission` already guarantees score ≤ total and a
    /// percentage in range.
    #[must_use]
    pub fn from_submission(
        id: ResultId,
        session: &ExamSession,
        exam_id: ExamId,
        graded: GradedSubmission,
        answers: HashMap<QuestionId, String>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id: session.id(),
            exam_id,
            student_name: session.student_name().to_owned(),
            student_number: session.student_number().to_owned(),
            score: graded.score,
            total_points: graded.total_points,
            percentage: graded.percentage,
            passed: graded.passed,
            answers,
            correct: graded.correct,
            completed_at,
        }
    }

    /// Rehydrate a result from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ResultError` if the stored numbers are inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: ResultId,
        session_id: SessionId,
        exam_id: ExamId,
        student_name: String,
        student_number: String,
        score: u32,
        total_points: u32,
        percentage: u8,
        passed: bool,
        answers: HashMap<QuestionId, String>,
        correct: HashMap<QuestionId, bool>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ResultError> {
        if score > total_points {
            return Err(ResultError::ScoreExceedsTotal {
                score,
                total: total_points,
            });
        }
        if percentage > 100 {
            return Err(ResultError::InvalidPercentage(percentage));
        }

        Ok(Self {
            id,
            session_id,
            exam_id,
            student_name,
            student_number,
            score,
            total_points,
            percentage,
            passed,
            answers,
            correct,
            completed_at,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ResultId {
        self.id
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
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

    /// Points earned on correctly answered questions.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Points across the questions that were actually gradable.
    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    #[must_use]
    pub fn answers(&self) -> &HashMap<QuestionId, String> {
        &self.answers
    }

    /// Per-question correctness as graded at submission.
    #[must_use]
    pub fn correct(&self) -> &HashMap<QuestionId, bool> {
        &self.correct
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn from_persisted_rejects_score_above_total() {
        let err = ExamResult::from_persisted(
            ResultId::new(),
            SessionId::new(),
            ExamId::new(),
            "Ada Obi".into(),
            "STU-001".into(),
            6,
            5,
            100,
            true,
            HashMap::new(),
            HashMap::new(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ResultError::ScoreExceedsTotal { score: 6, total: 5 });
    }

    #[test]
    fn from_persisted_rejects_percentage_above_100() {
        let err = ExamResult::from_persisted(
            ResultId::new(),
            SessionId::new(),
            ExamId::new(),
            "Ada Obi".into(),
            "STU-001".into(),
            5,
            5,
            101,
            true,
            HashMap::new(),
            HashMap::new(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ResultError::InvalidPercentage(101));
    }
}
