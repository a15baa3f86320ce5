use exam_core::model::{Student, StudentId};

use super::SqliteRepository;
use super::mapping::{map_sqlx_err, map_student_row};
use crate::repository::{StorageError, StudentRepository};

const INSERT_STUDENT: &str = r"
    INSERT INTO students (id, name, student_number, class_level, sex)
    VALUES (?1, ?2, ?3, ?4, ?5)
";

const SELECT_STUDENT: &str = r"
    SELECT id, name, student_number, class_level, sex
    FROM students
";

#[async_trait::async_trait]
impl StudentRepository for SqliteRepository {
    async fn insert_student(&self, student: &Student) -> Result<(), StorageError> {
        sqlx::query(INSERT_STUDENT)
            .bind(student.id().to_string())
            .bind(student.name())
            .bind(student.student_number())
            .bind(student.class_level())
            .bind(student.sex())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn insert_students(&self, students: &[Student]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
        for student in students {
            sqlx::query(INSERT_STUDENT)
                .bind(student.id().to_string())
                .bind(student.name())
                .bind(student.student_number())
                .bind(student.class_level())
                .bind(student.sex())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
        }
        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn list_students(&self) -> Result<Vec<Student>, StorageError> {
        let rows = sqlx::query(&format!("{SELECT_STUDENT} ORDER BY name ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let mut students = Vec::with_capacity(rows.len());
        for row in rows {
            students.push(map_student_row(&row)?);
        }
        Ok(students)
    }

    async fn update_student(&self, student: &Student) -> Result<(), StorageError> {
        let outcome = sqlx::query(
            r"
            UPDATE students SET
                name = ?2,
                student_number = ?3,
                class_level = ?4,
                sex = ?5
            WHERE id = ?1
            ",
        )
        .bind(student.id().to_string())
        .bind(student.name())
        .bind(student.student_number())
        .bind(student.class_level())
        .bind(student.sex())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        if outcome.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_student(&self, id: StudentId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM students WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }
}
