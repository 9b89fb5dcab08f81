//! Authentication service.
//!
//! Registration, password login and logout. Login and the session read operate
//! on a [`SessionState`] the caller has already locked; [`AuthService::establish`]
//! and logout go through the session store, which owns session IDs.
//!
//! Argon2 work runs on the blocking pool so a burst of logins does not stall
//! the async workers.

mod error;
mod hasher;

pub use error::AuthError;
pub use hasher::{Argon2Hasher, CredentialHasher};

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use market_stall_core::{Role, Username};

use crate::models::user::{User, UserView};
use crate::models::{Identity, SessionState};
use crate::services::access::authorize_identity;
use crate::store::{RepositoryError, SessionId, SessionStore, UserRepository};

const MISSING_CREDENTIALS: &str = "Username and password are required";
const INVALID_ROLE: &str = "Role must be admin or omitted";

/// Result of a login attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials verified; the session now carries this identity.
    LoggedIn(Identity),
    /// The session was already authenticated. Credentials were not checked.
    AlreadyLoggedIn,
}

/// Whether a session is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a UserRepository,
    sessions: &'a SessionStore,
    hasher: Arc<dyn CredentialHasher>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(
        users: &'a UserRepository,
        sessions: &'a SessionStore,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
        }
    }

    /// Register a new account.
    ///
    /// `role` may be omitted (or empty) for a `user` account, or `admin`.
    /// Creating an `admin` account requires `caller` to be a logged-in admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for an empty username or password, or
    /// any other role value.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    /// Returns `AuthError::Access` if the caller may not create admins.
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Option<&str>,
        caller: Option<&Identity>,
    ) -> Result<UserView, AuthError> {
        let username = parse_credentials(username, password)?;

        if self.users.exists(&username).await {
            return Err(AuthError::UserAlreadyExists);
        }

        let role = match role {
            None | Some("") => Role::User,
            Some(raw) if raw == Role::Admin.as_str() => Role::Admin,
            Some(_) => return Err(AuthError::Validation(INVALID_ROLE.to_owned())),
        };

        if role == Role::Admin {
            authorize_identity(caller, Role::CATALOG_EDITORS)?;
        }

        self.create_account(username, password, role).await
    }

    /// Create an account without a caller, for startup seeding.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`], minus the role checks.
    pub async fn provision(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<UserView, AuthError> {
        let username = parse_credentials(username, password)?;
        self.create_account(username, password, role).await
    }

    async fn create_account(
        &self,
        username: Username,
        password: &str,
        role: Role,
    ) -> Result<UserView, AuthError> {
        let password_hash = self.hash_password(password).await?;

        let user = User {
            username,
            password_hash,
            role,
            created_at: Utc::now(),
        };

        self.users.insert(user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
        })
    }

    /// Log a session in with a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if either field is empty.
    /// Returns `AuthError::UserNotFound` for an unknown username.
    /// Returns `AuthError::InvalidCredentials` if the password does not match.
    /// Returns `AuthError::PasswordHash` if verification itself fails.
    pub async fn login(
        &self,
        session: &mut SessionState,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(MISSING_CREDENTIALS.to_owned()));
        }

        if session.is_authenticated() {
            return Ok(LoginOutcome::AlreadyLoggedIn);
        }

        let username = Username::parse(username).map_err(|_| AuthError::UserNotFound)?;
        let user = self
            .users
            .find_by_username(&username)
            .await
            .ok_or(AuthError::UserNotFound)?;

        if !self.verify_password(password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let identity = Identity {
            username: user.username,
            role: user.role,
        };
        session.sign_in(identity.clone());

        Ok(LoginOutcome::LoggedIn(identity))
    }

    /// Store a freshly logged-in session under a new ID.
    ///
    /// The state moves out of `session`, leaving it anonymous, and `previous`
    /// stops resolving. Returns the ID the client must present from now on.
    pub async fn establish(
        &self,
        previous: Option<&SessionId>,
        session: &mut SessionState,
    ) -> SessionId {
        let state = std::mem::take(session);
        let (id, _) = self.sessions.establish(previous, state).await;
        id
    }

    /// Discard a session. Anonymous (`None`) or unknown sessions are fine.
    pub async fn logout(&self, id: Option<&SessionId>) {
        if let Some(id) = id {
            self.sessions.destroy(id).await;
        }
    }

    /// Read a session's login status.
    #[must_use]
    pub const fn status(session: &SessionState) -> SessionStatus {
        SessionStatus {
            authenticated: session.is_authenticated(),
        }
    }
}

impl AuthService<'_> {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "password hashing task failed");
                AuthError::PasswordHash
            })?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "password verification task failed");
                AuthError::PasswordHash
            })?
    }
}

fn parse_credentials(username: &str, password: &str) -> Result<Username, AuthError> {
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(MISSING_CREDENTIALS.to_owned()));
    }

    Username::parse(username).map_err(|e| AuthError::Validation(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::SessionConfig;
    use crate::services::access::AccessDenied;

    struct Fixture {
        users: UserRepository,
        sessions: SessionStore,
        hasher: Arc<dyn CredentialHasher>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                users: UserRepository::new(),
                sessions: SessionStore::new(SessionConfig {
                    ttl: Duration::from_secs(60),
                    max_sessions: 100,
                }),
                hasher: Arc::new(Argon2Hasher::low_cost()),
            }
        }

        fn auth(&self) -> AuthService<'_> {
            AuthService::new(&self.users, &self.sessions, Arc::clone(&self.hasher))
        }
    }

    fn admin() -> Identity {
        Identity {
            username: Username::parse("root").unwrap(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn test_register_defaults_to_user_and_hides_hash() {
        let fx = Fixture::new();
        let view = fx.auth().register("alice", "pw1", None, None).await.unwrap();

        assert_eq!(view.role, Role::User);
        let stored = fx
            .users
            .find_by_username(&Username::parse("alice").unwrap())
            .await
            .unwrap();
        assert_ne!(stored.password_hash, "pw1");
    }

    #[tokio::test]
    async fn test_register_requires_both_fields() {
        let fx = Fixture::new();
        for (username, password) in [("", "pw"), ("alice", ""), ("", "")] {
            let err = fx
                .auth()
                .register(username, password, None, None)
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)));
        }
        assert_eq!(fx.users.count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let fx = Fixture::new();
        fx.auth().register("alice", "pw1", None, None).await.unwrap();

        let err = fx
            .auth()
            .register("alice", "other", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
        assert_eq!(fx.users.count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_role_is_rejected() {
        let fx = Fixture::new();
        let err = fx
            .auth()
            .register("alice", "pw1", Some("superuser"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_explicit_user_role_is_rejected() {
        let fx = Fixture::new();
        let err = fx
            .auth()
            .register("alice", "pw1", Some("user"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref m) if m == INVALID_ROLE));
        assert_eq!(fx.users.count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_role_means_user() {
        let fx = Fixture::new();
        let view = fx
            .auth()
            .register("alice", "pw1", Some(""), None)
            .await
            .unwrap();
        assert_eq!(view.role, Role::User);
    }

    #[tokio::test]
    async fn test_usernames_are_taken_verbatim() {
        let fx = Fixture::new();
        fx.auth().register("alice", "pw1", None, None).await.unwrap();
        fx.auth().register(" alice", "pw2", None, None).await.unwrap();
        assert_eq!(fx.users.count().await, 2);

        let mut session = SessionState::new();
        let err = fx
            .auth()
            .login(&mut session, " alice", "pw1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_anonymous_cannot_self_register_as_admin() {
        let fx = Fixture::new();
        let err = fx
            .auth()
            .register("mallory", "pw", Some("admin"), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Access(AccessDenied::Unauthenticated)
        ));
        assert_eq!(fx.users.count().await, 0);
    }

    #[tokio::test]
    async fn test_user_cannot_create_admin() {
        let fx = Fixture::new();
        let caller = Identity {
            username: Username::parse("bob").unwrap(),
            role: Role::User,
        };
        let err = fx
            .auth()
            .register("mallory", "pw", Some("admin"), Some(&caller))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Access(AccessDenied::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_admin_can_create_admin() {
        let fx = Fixture::new();
        let view = fx
            .auth()
            .register("deputy", "pw", Some("admin"), Some(&admin()))
            .await
            .unwrap();
        assert_eq!(view.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_login_succeeds_only_with_matching_password() {
        let fx = Fixture::new();
        fx.auth().register("alice", "pw1", None, None).await.unwrap();

        let mut session = SessionState::new();
        let err = fx
            .auth()
            .login(&mut session, "alice", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(!session.is_authenticated());

        let outcome = fx.auth().login(&mut session, "alice", "pw1").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::LoggedIn(ref id) if id.username.as_str() == "alice"));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let fx = Fixture::new();
        let mut session = SessionState::new();
        let err = fx
            .auth()
            .login(&mut session, "ghost", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_login_validates_before_short_circuit() {
        let fx = Fixture::new();
        let mut session = SessionState::new();
        session.sign_in(admin());

        let err = fx.auth().login(&mut session, "", "").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_when_already_logged_in_skips_credentials() {
        let fx = Fixture::new();
        let mut session = SessionState::new();
        session.sign_in(admin());

        let outcome = fx
            .auth()
            .login(&mut session, "nobody", "nothing")
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::AlreadyLoggedIn);
        assert_eq!(session.identity(), Some(&admin()));
    }

    #[tokio::test]
    async fn test_establish_moves_state_to_a_new_id() {
        let fx = Fixture::new();
        fx.auth().register("alice", "pw1", None, None).await.unwrap();
        let (previous, _) = fx.sessions.establish(None, SessionState::new()).await;

        let mut session = SessionState::new();
        fx.auth().login(&mut session, "alice", "pw1").await.unwrap();
        let id = fx.auth().establish(Some(&previous), &mut session).await;

        assert_ne!(id, previous);
        assert!(!session.is_authenticated());
        assert!(fx.sessions.load(&previous).await.is_none());
        let stored = fx.sessions.load(&id).await.unwrap();
        assert!(stored.lock().await.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let fx = Fixture::new();
        let mut state = SessionState::new();
        state.sign_in(admin());
        let (id, handle) = fx.sessions.establish(None, state).await;

        fx.auth().logout(Some(&id)).await;

        assert!(!AuthService::status(&*handle.lock().await).authenticated);
        assert!(fx.sessions.load(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_logout_without_session_is_noop() {
        let fx = Fixture::new();
        fx.auth().logout(None).await;
        fx.sessions.sync().await;
        assert!(fx.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_provision_skips_caller_check() {
        let fx = Fixture::new();
        let view = fx.auth().provision("root", "pw", Role::Admin).await.unwrap();
        assert_eq!(view.role, Role::Admin);
    }
}
