//! User domain types.
//!
//! `User` holds the password hash and is never serialized; every response and
//! log line goes through [`UserView`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use market_stall_core::{Role, Username};

/// A registered account (domain type).
#[derive(Clone)]
pub struct User {
    /// Unique login name.
    pub username: Username,
    /// Argon2 PHC string; never leaves the service.
    pub password_hash: String,
    /// Permission level.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The public rendering of this account.
    #[must_use]
    pub fn view(&self) -> UserView {
        UserView {
            username: self.username.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Account data safe to return to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub username: Username,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            username: Username::parse("alice").unwrap(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_view_excludes_hash() {
        let json = serde_json::to_value(sample_user().view()).unwrap();

        assert_eq!(json["username"], "alice");
        assert_eq!(json["role"], "user");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_debug_redacts_hash() {
        let debug_output = format!("{:?}", sample_user());
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("argon2id"));
    }
}
