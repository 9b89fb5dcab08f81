//! Application state shared across handlers.

use std::sync::Arc;

use market_stall_core::Role;
use secrecy::ExposeSecret;

use crate::config::ApiConfig;
use crate::models::UserView;
use crate::services::{AuthError, AuthService, CartService, CatalogService, CredentialHasher};
use crate::store::{Catalog, SessionStore, UserRepository};

/// Application state shared across all handlers.
///
/// Cheap to clone; every store sits behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    users: UserRepository,
    catalog: Catalog,
    sessions: SessionStore,
    hasher: Arc<dyn CredentialHasher>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration; the session store is sized from it
    /// * `catalog` - Items and categories to serve
    /// * `hasher` - Password hashing implementation
    #[must_use]
    pub fn new(config: ApiConfig, catalog: Catalog, hasher: impl CredentialHasher + 'static) -> Self {
        let sessions = SessionStore::new(config.session);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                users: UserRepository::new(),
                catalog,
                sessions,
                hasher: Arc::new(hasher),
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn users(&self) -> &UserRepository {
        &self.inner.users
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Authentication service over this state's stores.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(
            &self.inner.users,
            &self.inner.sessions,
            Arc::clone(&self.inner.hasher),
        )
    }

    #[must_use]
    pub fn cart(&self) -> CartService<'_> {
        CartService::new(&self.inner.catalog)
    }

    #[must_use]
    pub fn catalog_service(&self) -> CatalogService<'_> {
        CatalogService::new(&self.inner.catalog)
    }

    /// Create the configured bootstrap admin, if any.
    ///
    /// Returns `Ok(None)` when no bootstrap admin is configured or the account
    /// already exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the account cannot be created.
    pub async fn seed_bootstrap_admin(&self) -> Result<Option<UserView>, AuthError> {
        let Some(admin) = &self.inner.config.bootstrap_admin else {
            return Ok(None);
        };

        match self
            .auth()
            .provision(&admin.username, admin.password.expose_secret(), Role::Admin)
            .await
        {
            Ok(view) => Ok(Some(view)),
            Err(AuthError::UserAlreadyExists) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
