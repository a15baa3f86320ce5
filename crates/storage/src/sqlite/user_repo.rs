use sqlx::Row;

use exam_core::model::AdminUser;

use super::SqliteRepository;
use super::mapping::{map_sqlx_err, map_user_row, ser};
use crate::repository::{StorageError, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn insert_user(&self, user: &AdminUser) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO users (id, username, password_hash)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(user.id().to_string())
        .bind(user.username())
        .bind(user.password_hash())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminUser>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, username, password_hash
            FROM users
            WHERE username = ?1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn count_users(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let count: i64 = row.try_get("n").map_err(ser)?;
        u64::try_from(count).map_err(ser)
    }
}
