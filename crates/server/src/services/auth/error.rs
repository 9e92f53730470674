//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more form checks failed; messages are user-facing.
    #[error("validation failed: {}", .0.join(" "))]
    Validation(Vec<String>),

    /// Invalid credentials (wrong password or unknown email).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Repository error.
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Messages to show the visitor, one per problem.
    #[must_use]
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Self::Validation(messages) => messages.clone(),
            Self::InvalidCredentials => {
                vec!["Invalid email or password. Please try again.".to_string()]
            }
            Self::UserAlreadyExists => vec![
                "An account with this email already exists. Please sign in instead.".to_string(),
            ],
            Self::Repository(_) | Self::PasswordHash => {
                vec!["Something went wrong. Please try again.".to_string()]
            }
        }
    }
}
