use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("password hash cannot be empty")]
    EmptyPasswordHash,
}

/// An administrator account.
///
/// Carries only the PHC-formatted password hash; verification lives in the
/// services layer. Deliberately not serializable.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUser {
    id: UserId,
    username: String,
    password_hash: String,
}

impl AdminUser {
    /// Creates an admin account from an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if the username or hash is empty.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<Self, UserError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserError::EmptyUsername);
        }
        let password_hash = password_hash.into();
        if password_hash.trim().is_empty() {
            return Err(UserError::EmptyPasswordHash);
        }

        Ok(Self {
            id,
            username: username.trim().to_owned(),
            password_hash,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_username() {
        let err = AdminUser::new(UserId::new(), " ", "$argon2id$stub").unwrap_err();
        assert_eq!(err, UserError::EmptyUsername);
    }

    #[test]
    fn rejects_blank_hash() {
        let err = AdminUser::new(UserId::new(), "Admin", "").unwrap_err();
        assert_eq!(err, UserError::EmptyPasswordHash);
    }

    #[test]
    fn trims_username() {
        let user = AdminUser::new(UserId::new(), " Admin ", "$argon2id$stub").unwrap();
        assert_eq!(user.username(), "Admin");
    }
}
