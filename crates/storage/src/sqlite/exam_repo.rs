use exam_core::model::{Exam, ExamId};

use super::SqliteRepository;
use super::mapping::{map_exam_row, map_sqlx_err, question_ids_to_json};
use crate::repository::{ExamRepository, StorageError};

const SELECT_EXAM: &str = r"
    SELECT id, title, class_level, subject, question_ids, questions_to_display,
           duration_mins, passing_score, total_points, is_active, created_at
    FROM exams
";

#[async_trait::async_trait]
impl ExamRepository for SqliteRepository {
    async fn insert_exam(&self, exam: &Exam) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO exams (
                id, title, class_level, subject, question_ids, questions_to_display,
                duration_mins, passing_score, total_points, is_active, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ",
        )
        .bind(exam.id().to_string())
        .bind(exam.title())
        .bind(exam.class_level())
        .bind(exam.subject())
        .bind(question_ids_to_json(exam.question_ids())?)
        .bind(exam.questions_to_display().map(i64::from))
        .bind(i64::from(exam.duration_mins()))
        .bind(i64::from(exam.passing_score()))
        .bind(i64::from(exam.total_points()))
        .bind(exam.is_active())
        .bind(exam.created_at())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn get_exam(&self, id: ExamId) -> Result<Option<Exam>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_EXAM} WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        row.as_ref().map(map_exam_row).transpose()
    }

    async fn list_exams(&self, class_level: Option<&str>) -> Result<Vec<Exam>, StorageError> {
        let rows = match class_level {
            Some(level) => {
                sqlx::query(&format!(
                    "{SELECT_EXAM} WHERE class_level = ?1 ORDER BY created_at DESC"
                ))
                .bind(level)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{SELECT_EXAM} ORDER BY created_at DESC"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(map_sqlx_err)?;

        let mut exams = Vec::with_capacity(rows.len());
        for row in rows {
            exams.push(map_exam_row(&row)?);
        }
        Ok(exams)
    }

    async fn update_exam(&self, exam: &Exam) -> Result<(), StorageError> {
        let outcome = sqlx::query(
            r"
            UPDATE exams SET
                title = ?2,
                class_level = ?3,
                subject = ?4,
                question_ids = ?5,
                questions_to_display = ?6,
                duration_mins = ?7,
                passing_score = ?8,
                total_points = ?9,
                is_active = ?10
            WHERE id = ?1
            ",
        )
        .bind(exam.id().to_string())
        .bind(exam.title())
        .bind(exam.class_level())
        .bind(exam.subject())
        .bind(question_ids_to_json(exam.question_ids())?)
        .bind(exam.questions_to_display().map(i64::from))
        .bind(i64::from(exam.duration_mins()))
        .bind(i64::from(exam.passing_score()))
        .bind(i64::from(exam.total_points()))
        .bind(exam.is_active())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        if outcome.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_exam(&self, id: ExamId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM exams WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }
}
