use std::sync::Arc;

use exam_core::model::{Question, QuestionId};
use storage::repository::QuestionRepository;

use crate::error::QuestionBankError;

/// Admin-supplied fields for a new bank question.
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub subject: String,
    pub class_level: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub points: Option<u32>,
}

/// Question-bank maintenance.
#[derive(Clone)]
pub struct QuestionService {
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }

    /// Add one question to the bank.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError` if the draft fails validation or storage
    /// fails.
    pub async fn add_question(&self, draft: QuestionDraft) -> Result<Question, QuestionBankError> {
        let question = build_question(draft)?;
        self.questions.insert_question(&question).await?;
        Ok(question)
    }

    /// Add a batch of questions; nothing is stored if any draft is invalid.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError` if a draft fails validation or storage
    /// fails.
    pub async fn add_questions(
        &self,
        drafts: Vec<QuestionDraft>,
    ) -> Result<Vec<Question>, QuestionBankError> {
        let questions = drafts
            .into_iter()
            .map(build_question)
            .collect::<Result<Vec<_>, _>>()?;
        self.questions.insert_questions(&questions).await?;
        tracing::info!(count = questions.len(), "questions imported");
        Ok(questions)
    }

    /// Fetch a question by id; `None` if missing.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` on repository failures.
    pub async fn get_question(
        &self,
        id: QuestionId,
    ) -> Result<Option<Question>, QuestionBankError> {
        Ok(self.questions.get_question(id).await?)
    }

    /// List the whole bank.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` on repository failures.
    pub async fn list_questions(&self) -> Result<Vec<Question>, QuestionBankError> {
        Ok(self.questions.list_questions().await?)
    }

    /// Remove a question; sessions already holding it simply skip it at
    /// grading time.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` on repository failures.
    pub async fn remove_question(&self, id: QuestionId) -> Result<(), QuestionBankError> {
        Ok(self.questions.delete_question(id).await?)
    }

    /// Remove a batch of questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` on repository failures.
    pub async fn remove_questions(&self, ids: &[QuestionId]) -> Result<(), QuestionBankError> {
        Ok(self.questions.delete_questions(ids).await?)
    }
}

fn build_question(draft: QuestionDraft) -> Result<Question, QuestionBankError> {
    Ok(Question::new(
        QuestionId::new(),
        draft.subject,
        draft.class_level,
        draft.prompt,
        draft.options,
        draft.correct_answer,
        draft.points,
    )?)
}
