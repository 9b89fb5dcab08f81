//! User repository.
//!
//! Accounts are kept in registration order; a username index makes lookups
//! and the uniqueness check constant time.

use std::collections::HashMap;

use tokio::sync::RwLock;

use market_stall_core::Username;

use super::RepositoryError;
use crate::models::user::{User, UserView};

#[derive(Default)]
struct UserTable {
    rows: Vec<User>,
    by_username: HashMap<Username, usize>,
}

/// Repository for user accounts.
#[derive(Default)]
pub struct UserRepository {
    table: RwLock<UserTable>,
}

impl UserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new user.
    ///
    /// The uniqueness check and the insert happen under one write lock, so two
    /// concurrent registrations of the same name cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    pub async fn insert(&self, user: User) -> Result<UserView, RepositoryError> {
        let mut table = self.table.write().await;

        if table.by_username.contains_key(&user.username) {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        let view = user.view();
        let index = table.rows.len();
        table.by_username.insert(user.username.clone(), index);
        table.rows.push(user);

        Ok(view)
    }

    /// Get a user by username.
    pub async fn find_by_username(&self, username: &Username) -> Option<User> {
        let table = self.table.read().await;
        table
            .by_username
            .get(username)
            .and_then(|&index| table.rows.get(index))
            .cloned()
    }

    /// Whether a username is taken.
    pub async fn exists(&self, username: &Username) -> bool {
        self.table.read().await.by_username.contains_key(username)
    }

    /// All users in registration order, without password hashes.
    pub async fn list(&self) -> Vec<UserView> {
        self.table.read().await.rows.iter().map(User::view).collect()
    }

    /// Number of registered users.
    pub async fn count(&self) -> usize {
        self.table.read().await.rows.len()
    }
}
