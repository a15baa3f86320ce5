use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{ExamId, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error("exam title cannot be empty")]
    EmptyTitle,

    #[error("class level cannot be empty")]
    EmptyClassLevel,

    #[error("passing score must be between 0 and 100, got {0}")]
    InvalidPassingScore(u8),

    #[error("exam duration must be at least one minute")]
    InvalidDuration,
}

/// Admin-authored exam template, reused across many student sessions.
///
/// Holds the full candidate question pool; each session draws its own
/// shuffled subset of up to `questions_to_display` entries from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exam {
    id: ExamId,
    title: String,
    class_level: String,
    subject: Option<String>,
    question_ids: Vec<QuestionId>,
    questions_to_display: Option<u32>,
    duration_mins: u32,
    passing_score: u8,
    total_points: u32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl Exam {
    /// Creates a new exam.
    ///
    /// `questions_to_display` of `None` or `Some(0)` means the whole pool is
    /// shown; both are stored as `None`. `total_points` is the sum of the
    /// pool's question points, computed by the caller once at creation.
    ///
    /// # Errors
    ///
    /// Returns `ExamError` if the title or class level is empty, the passing
    /// score exceeds 100, or the duration is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ExamId,
        title: impl Into<String>,
        class_level: impl Into<String>,
        subject: Option<String>,
        question_ids: Vec<QuestionId>,
        questions_to_display: Option<u32>,
        duration_mins: u32,
        passing_score: u8,
        total_points: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ExamError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ExamError::EmptyTitle);
        }
        let class_level = class_level.into();
        if class_level.trim().is_empty() {
            return Err(ExamError::EmptyClassLevel);
        }
        if passing_score > 100 {
            return Err(ExamError::InvalidPassingScore(passing_score));
        }
        if duration_mins == 0 {
            return Err(ExamError::InvalidDuration);
        }

        let subject = subject
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            class_level: class_level.trim().to_owned(),
            subject,
            question_ids,
            questions_to_display: questions_to_display.filter(|n| *n > 0),
            duration_mins,
            passing_score,
            total_points,
            is_active: true,
            created_at,
        })
    }

    /// Rehydrate an exam from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ExamError` if a stored field fails validation.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: ExamId,
        title: String,
        class_level: String,
        subject: Option<String>,
        question_ids: Vec<QuestionId>,
        questions_to_display: Option<u32>,
        duration_mins: u32,
        passing_score: u8,
        total_points: u32,
        is_active: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ExamError> {
        let mut exam = Self::new(
            id,
            title,
            class_level,
            subject,
            question_ids,
            questions_to_display,
            duration_mins,
            passing_score,
            total_points,
            created_at,
        )?;
        exam.is_active = is_active;
        Ok(exam)
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ExamId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn class_level(&self) -> &str {
        &self.class_level
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// The full candidate pool this exam samples from.
    #[must_use]
    pub fn question_ids(&self) -> &[QuestionId] {
        &self.question_ids
    }

    /// How many pool questions a session shows; `None` means all of them.
    #[must_use]
    pub fn questions_to_display(&self) -> Option<u32> {
        self.questions_to_display
    }

    #[must_use]
    pub fn duration_mins(&self) -> u32 {
        self.duration_mins
    }

    /// Minimum percentage required to pass, 0..=100.
    #[must_use]
    pub fn passing_score(&self) -> u8 {
        self.passing_score
    }

    /// Sum of the pool's question points, cached at creation.
    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // Admin edits
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Replace the question pool, together with its recomputed point total.
    pub fn set_questions(&mut self, question_ids: Vec<QuestionId>, total_points: u32) {
        self.question_ids = question_ids;
        self.total_points = total_points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn build_exam(questions_to_display: Option<u32>) -> Exam {
        Exam::new(
            ExamId::new(),
            "First Term Geography",
            "JSS1",
            Some("Geography".into()),
            vec![QuestionId::new(), QuestionId::new()],
            questions_to_display,
            30,
            50,
            5,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn exam_new_happy_path() {
        let exam = build_exam(Some(2));
        assert_eq!(exam.title(), "First Term Geography");
        assert_eq!(exam.subject(), Some("Geography"));
        assert_eq!(exam.questions_to_display(), Some(2));
        assert_eq!(exam.passing_score(), 50);
        assert!(exam.is_active());
    }

    #[test]
    fn zero_display_count_means_whole_pool() {
        let exam = build_exam(Some(0));
        assert_eq!(exam.questions_to_display(), None);
    }

    #[test]
    fn rejects_empty_title() {
        let err = Exam::new(
            ExamId::new(),
            "  ",
            "JSS1",
            None,
            Vec::new(),
            None,
            30,
            50,
            0,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ExamError::EmptyTitle);
    }

    #[test]
    fn rejects_out_of_range_passing_score() {
        let err = Exam::new(
            ExamId::new(),
            "Quiz",
            "JSS1",
            None,
            Vec::new(),
            None,
            30,
            101,
            0,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ExamError::InvalidPassingScore(101));
    }

    #[test]
    fn rejects_zero_duration() {
        let err = Exam::new(
            ExamId::new(),
            "Quiz",
            "JSS1",
            None,
            Vec::new(),
            None,
            0,
            50,
            0,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ExamError::InvalidDuration);
    }

    #[test]
    fn blank_subject_is_dropped() {
        let exam = Exam::new(
            ExamId::new(),
            "Quiz",
            "JSS1",
            Some("  ".into()),
            Vec::new(),
            None,
            30,
            50,
            0,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(exam.subject(), None);
    }

    #[test]
    fn set_questions_updates_pool_and_total() {
        let mut exam = build_exam(None);
        let new_pool = vec![QuestionId::new()];
        exam.set_questions(new_pool.clone(), 4);
        assert_eq!(exam.question_ids(), new_pool.as_slice());
        assert_eq!(exam.total_points(), 4);
    }
}
