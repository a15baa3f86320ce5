use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use exam_core::model::{AdminUser, UserId};
use storage::repository::UserRepository;

use crate::error::AuthError;

/// Bootstrap credentials seeded into an empty user store.
const DEFAULT_ADMIN_USERNAME: &str = "Admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Admin authentication over salted argon2 hashes.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Create an admin account, hashing the password before it is stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Hash` if hashing fails, or `AuthError::Storage`
    /// (`Conflict`) for a taken username.
    pub async fn create_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminUser, AuthError> {
        let password_hash = hash_password(password)?;
        let user = AdminUser::new(UserId::new(), username, password_hash)?;
        self.users.insert_user(&user).await?;
        Ok(user)
    }

    /// Verify a username/password pair against the stored hash.
    ///
    /// An unknown username and a wrong password both come back as
    /// `InvalidCredentials`; callers cannot tell which it was.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on a failed check,
    /// `AuthError::Hash` for an unparsable stored hash, or
    /// `AuthError::Storage` on repository failures.
    pub async fn verify_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminUser, AuthError> {
        let user = self
            .users
            .find_user_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if verify_password(password, user.password_hash())? {
            Ok(user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Seed the default admin account when the user store is empty.
    ///
    /// Returns the created account, or `None` when accounts already exist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if seeding fails.
    pub async fn ensure_default_admin(&self) -> Result<Option<AdminUser>, AuthError> {
        if self.users.count_users().await? > 0 {
            return Ok(None);
        }

        let user = self
            .create_admin(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
            .await?;
        tracing::warn!(
            username = DEFAULT_ADMIN_USERNAME,
            "seeded default admin account; change its password before going live"
        );
        Ok(Some(user))
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| AuthError::Hash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
