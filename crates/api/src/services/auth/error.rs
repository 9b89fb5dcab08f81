//! Authentication error types.

use thiserror::Error;

use crate::services::access::AccessDenied;
use crate::store::RepositoryError;

/// Errors that can occur during registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Username is already registered.
    #[error("Username already exists")]
    UserAlreadyExists,

    /// No account with that username.
    #[error("Invalid username or password")]
    UserNotFound,

    /// Password did not verify.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The caller may not assign the requested role.
    #[error(transparent)]
    Access(#[from] AccessDenied),

    /// Password hashing or hash parsing failed.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
