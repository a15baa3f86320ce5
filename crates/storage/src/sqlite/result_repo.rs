use exam_core::model::{ExamResult, ResultId, SessionId};

use super::SqliteRepository;
use super::mapping::{answers_to_json, correct_to_json, map_result_row, map_sqlx_err};
use crate::repository::{ResultRepository, StorageError};

const SELECT_RESULT: &str = r"
    SELECT id, session_id, exam_id, student_name, student_number, score,
           total_points, percentage, passed, answers, correct, completed_at
    FROM results
";

#[async_trait::async_trait]
impl ResultRepository for SqliteRepository {
    async fn insert_result(&self, result: &ExamResult) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO results (
                id, session_id, exam_id, student_name, student_number, score,
                total_points, percentage, passed, answers, correct, completed_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
        )
        .bind(result.id().to_string())
        .bind(result.session_id().to_string())
        .bind(result.exam_id().to_string())
        .bind(result.student_name())
        .bind(result.student_number())
        .bind(i64::from(result.score()))
        .bind(i64::from(result.total_points()))
        .bind(i64::from(result.percentage()))
        .bind(result.passed())
        .bind(answers_to_json(result.answers())?)
        .bind(correct_to_json(result.correct())?)
        .bind(result.completed_at())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn get_result(&self, id: ResultId) -> Result<Option<ExamResult>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_RESULT} WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        row.as_ref().map(map_result_row).transpose()
    }

    async fn list_results(&self) -> Result<Vec<ExamResult>, StorageError> {
        let rows = sqlx::query(&format!("{SELECT_RESULT} ORDER BY completed_at DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(map_result_row(&row)?);
        }
        Ok(results)
    }

    async fn result_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<ExamResult>, StorageError> {
        let row = sqlx::query(&format!(
            "{SELECT_RESULT} WHERE session_id = ?1 ORDER BY completed_at ASC LIMIT 1"
        ))
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.as_ref().map(map_result_row).transpose()
    }
}
