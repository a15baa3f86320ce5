use exam_core::model::{ExamSession, SessionId};

use super::SqliteRepository;
use super::mapping::{answers_to_json, map_session_row, map_sqlx_err, question_ids_to_json, ser};
use crate::repository::{SessionRepository, StorageError};

const SELECT_SESSION: &str = r"
    SELECT id, exam_id, student_name, student_number, token, question_ids,
           answers, current_question_index, started_at, ended_at, is_completed
    FROM exam_sessions
";

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn insert_session(&self, session: &ExamSession) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO exam_sessions (
                id, exam_id, student_name, student_number, token, question_ids,
                answers, current_question_index, started_at, ended_at, is_completed
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ",
        )
        .bind(session.id().to_string())
        .bind(session.exam_id().to_string())
        .bind(session.student_name())
        .bind(session.student_number())
        .bind(session.token().to_string())
        .bind(question_ids_to_json(session.question_ids())?)
        .bind(answers_to_json(session.answers())?)
        .bind(i64::try_from(session.current_question_index()).map_err(ser)?)
        .bind(session.started_at())
        .bind(session.ended_at())
        .bind(session.is_completed())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<ExamSession>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_SESSION} WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        row.as_ref().map(map_session_row).transpose()
    }

    async fn update_session(&self, session: &ExamSession) -> Result<(), StorageError> {
        // id, exam_id, token, and question_ids are fixed at creation and
        // deliberately left out of the update
        let outcome = sqlx::query(
            r"
            UPDATE exam_sessions SET
                answers = ?2,
                current_question_index = ?3,
                ended_at = ?4,
                is_completed = ?5
            WHERE id = ?1
            ",
        )
        .bind(session.id().to_string())
        .bind(answers_to_json(session.answers())?)
        .bind(i64::try_from(session.current_question_index()).map_err(ser)?)
        .bind(session.ended_at())
        .bind(session.is_completed())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        if outcome.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
