//! In-memory storage for the service.
//!
//! Everything lives for the lifetime of the process:
//!
//! - [`users::UserRepository`] - Registered accounts and their password hashes
//! - [`catalog::Catalog`] - Items and categories
//! - [`sessions::SessionStore`] - Per-client session state with a fixed TTL
//!
//! Each store owns its collection behind an async lock and is shared through
//! [`crate::state::AppState`].

pub mod catalog;
pub mod sessions;
pub mod users;

use thiserror::Error;

pub use catalog::Catalog;
pub use sessions::{SessionHandle, SessionId, SessionStore};
pub use users::UserRepository;

/// Repository errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}
