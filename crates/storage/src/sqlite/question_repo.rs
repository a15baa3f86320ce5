use exam_core::model::{Question, QuestionId};

use super::SqliteRepository;
use super::mapping::{map_question_row, map_sqlx_err, options_to_json};
use crate::repository::{QuestionRepository, StorageError};

const INSERT_QUESTION: &str = r"
    INSERT INTO questions (id, subject, class_level, prompt, options, correct_answer, points)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
";

const SELECT_QUESTION: &str = r"
    SELECT id, subject, class_level, prompt, options, correct_answer, points
    FROM questions
";

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_question(&self, question: &Question) -> Result<(), StorageError> {
        sqlx::query(INSERT_QUESTION)
            .bind(question.id().to_string())
            .bind(question.subject())
            .bind(question.class_level())
            .bind(question.prompt())
            .bind(options_to_json(question.options())?)
            .bind(question.correct_answer())
            .bind(i64::from(question.points()))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn insert_questions(&self, questions: &[Question]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
        for question in questions {
            sqlx::query(INSERT_QUESTION)
                .bind(question.id().to_string())
                .bind(question.subject())
                .bind(question.class_level())
                .bind(question.prompt())
                .bind(options_to_json(question.options())?)
                .bind(question.correct_answer())
                .bind(i64::from(question.points()))
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
        }
        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_QUESTION} WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        row.as_ref().map(map_question_row).transpose()
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(&format!("{SELECT_QUESTION} ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }
        Ok(questions)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM questions WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn delete_questions(&self, ids: &[QuestionId]) -> Result<(), StorageError> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut sql = String::from("DELETE FROM questions WHERE id IN (");
        for i in 0..ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 1).to_string());
        }
        sql.push(')');

        let mut q = sqlx::query(&sql);
        for id in ids {
            q = q.bind(id.to_string());
        }
        q.execute(&self.pool).await.map_err(map_sqlx_err)?;
        Ok(())
    }
}
