use serde::Serialize;
use thiserror::Error;

use crate::model::ids::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("correct answer cannot be empty")]
    EmptyCorrectAnswer,

    #[error("subject cannot be empty")]
    EmptySubject,

    #[error("class level cannot be empty")]
    EmptyClassLevel,
}

/// A single bank question, tagged with subject and class level.
///
/// The point value is normalized at construction: absent or zero becomes 1,
/// so a question is never worth nothing by accident.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    id: QuestionId,
    subject: String,
    class_level: String,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    points: u32,
}

impl Question {
    /// Creates a new question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt, correct answer, subject, or
    /// class level is empty or whitespace-only.
    pub fn new(
        id: QuestionId,
        subject: impl Into<String>,
        class_level: impl Into<String>,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        points: Option<u32>,
    ) -> Result<Self, QuestionError> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(QuestionError::EmptySubject);
        }
        let class_level = class_level.into();
        if class_level.trim().is_empty() {
            return Err(QuestionError::EmptyClassLevel);
        }
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let correct_answer = correct_answer.into();
        if correct_answer.trim().is_empty() {
            return Err(QuestionError::EmptyCorrectAnswer);
        }

        Ok(Self {
            id,
            subject: subject.trim().to_owned(),
            class_level: class_level.trim().to_owned(),
            prompt: prompt.trim().to_owned(),
            options,
            correct_answer: correct_answer.trim().to_owned(),
            points: points.filter(|p| *p > 0).unwrap_or(1),
        })
    }

    /// Rehydrate a question from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if a stored text field fails validation.
    pub fn from_persisted(
        id: QuestionId,
        subject: String,
        class_level: String,
        prompt: String,
        options: Vec<String>,
        correct_answer: String,
        points: u32,
    ) -> Result<Self, QuestionError> {
        Self::new(
            id,
            subject,
            class_level,
            prompt,
            options,
            correct_answer,
            Some(points),
        )
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn class_level(&self) -> &str {
        &self.class_level
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Answer options shown to the student; empty for free-text questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Whether a submitted answer matches the correct one.
    ///
    /// Comparison is trimmed and case-insensitive on both sides.
    #[must_use]
    pub fn matches_answer(&self, submitted: &str) -> bool {
        submitted.trim().to_lowercase() == self.correct_answer.to_lowercase()
    }
}
