use std::collections::HashMap;
use std::sync::Arc;

use exam_core::Clock;
use exam_core::model::{Exam, ExamId, Question, QuestionId};
use storage::repository::{ExamRepository, QuestionRepository};

use crate::error::ExamAdminError;

/// Admin-supplied fields for a new exam.
///
/// Leave `question_ids` empty (with a positive display count) to have the
/// pool built automatically from the bank, filtered by the exam's class
/// level and, when given, its subject.
#[derive(Debug, Clone)]
pub struct ExamDraft {
    pub title: String,
    pub class_level: String,
    pub subject: Option<String>,
    pub question_ids: Vec<QuestionId>,
    pub questions_to_display: Option<u32>,
    pub duration_mins: u32,
    pub passing_score: u8,
}

/// Exam administration: creation with pool resolution, updates, and listing.
#[derive(Clone)]
pub struct ExamService {
    clock: Clock,
    exams: Arc<dyn ExamRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl ExamService {
    #[must_use]
    pub fn new(
        clock: Clock,
        exams: Arc<dyn ExamRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            clock,
            exams,
            questions,
        }
    }

    /// Create an exam, resolving its question pool and caching the pool's
    /// point total.
    ///
    /// # Errors
    ///
    /// Returns `ExamAdminError` if the draft fails validation or storage
    /// fails.
    pub async fn create_exam(&self, draft: ExamDraft) -> Result<Exam, ExamAdminError> {
        let bank = self.questions.list_questions().await?;

        let question_ids = if draft.question_ids.is_empty()
            && draft.questions_to_display.unwrap_or(0) > 0
        {
            bank.iter()
                .filter(|q| {
                    q.class_level() == draft.class_level
                        && draft.subject.as_deref().is_none_or(|s| q.subject() == s)
                })
                .map(Question::id)
                .collect()
        } else {
            draft.question_ids
        };

        let total_points = pool_points(&bank, &question_ids);

        let exam = Exam::new(
            ExamId::new(),
            draft.title,
            draft.class_level,
            draft.subject,
            question_ids,
            draft.questions_to_display,
            draft.duration_mins,
            draft.passing_score,
            total_points,
            self.clock.now(),
        )?;
        self.exams.insert_exam(&exam).await?;

        tracing::info!(
            exam = %exam.id(),
            pool = exam.question_ids().len(),
            total_points = exam.total_points(),
            "exam created"
        );
        Ok(exam)
    }

    /// Fetch an exam by id; `None` if missing.
    ///
    /// # Errors
    ///
    /// Returns `ExamAdminError::Storage` on repository failures.
    pub async fn get_exam(&self, id: ExamId) -> Result<Option<Exam>, ExamAdminError> {
        Ok(self.exams.get_exam(id).await?)
    }

    /// List exams, optionally restricted to one class level.
    ///
    /// # Errors
    ///
    /// Returns `ExamAdminError::Storage` on repository failures.
    pub async fn list_exams(
        &self,
        class_level: Option<&str>,
    ) -> Result<Vec<Exam>, ExamAdminError> {
        Ok(self.exams.list_exams(class_level).await?)
    }

    /// Overwrite an existing exam with admin edits.
    ///
    /// # Errors
    ///
    /// Returns `ExamAdminError::Storage` (`NotFound`) if the exam does not
    /// exist.
    pub async fn update_exam(&self, exam: &Exam) -> Result<(), ExamAdminError> {
        Ok(self.exams.update_exam(exam).await?)
    }

    /// Replace an exam's question pool and recompute its cached point total.
    ///
    /// # Errors
    ///
    /// Returns `ExamAdminError` if the exam is missing or storage fails.
    pub async fn set_exam_questions(
        &self,
        id: ExamId,
        question_ids: Vec<QuestionId>,
    ) -> Result<Exam, ExamAdminError> {
        let mut exam = self
            .exams
            .get_exam(id)
            .await?
            .ok_or(storage::repository::StorageError::NotFound)?;

        let bank = self.questions.list_questions().await?;
        let total_points = pool_points(&bank, &question_ids);
        exam.set_questions(question_ids, total_points);
        self.exams.update_exam(&exam).await?;
        Ok(exam)
    }

    /// Activate or retire an exam.
    ///
    /// # Errors
    ///
    /// Returns `ExamAdminError` if the exam is missing or storage fails.
    pub async fn set_active(&self, id: ExamId, active: bool) -> Result<Exam, ExamAdminError> {
        let mut exam = self
            .exams
            .get_exam(id)
            .await?
            .ok_or(storage::repository::StorageError::NotFound)?;
        exam.set_active(active);
        self.exams.update_exam(&exam).await?;
        Ok(exam)
    }

    /// Delete an exam; existing sessions and results keep their copies.
    ///
    /// # Errors
    ///
    /// Returns `ExamAdminError::Storage` on repository failures.
    pub async fn delete_exam(&self, id: ExamId) -> Result<(), ExamAdminError> {
        Ok(self.exams.delete_exam(id).await?)
    }
}

fn pool_points(bank: &[Question], pool: &[QuestionId]) -> u32 {
    let by_id: HashMap<QuestionId, &Question> = bank.iter().map(|q| (q.id(), q)).collect();
    pool.iter()
        .filter_map(|id| by_id.get(id))
        .map(|q| q.points())
        .sum()
}
