//! Access-controlled session extractor.
//!
//! [`Authorized<P>`] locks the request's session, checks it against policy
//! `P`, and hands the handler the identity together with the still-held lock,
//! so the whole read-modify-write of a cart happens under one lock.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn my_items(mut auth: Authorized<Shopper>) -> Json<Vec<CartLine>> {
//!     Json(auth.session.cart().to_vec())
//! }
//! ```

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};
use tokio::sync::OwnedMutexGuard;

use market_stall_core::Role;

use crate::error::AppError;
use crate::middleware::session::CurrentSession;
use crate::models::{Identity, SessionState};
use crate::services::access::{AccessDenied, authorize};

/// Who may pass an [`Authorized`] extractor.
pub trait AccessPolicy: Send + Sync + 'static {
    /// Roles admitted by this policy.
    const ALLOWED: &'static [Role];
    /// Body of the 401 sent to anonymous sessions.
    const UNAUTHENTICATED_MESSAGE: &'static str;
}

/// Any logged-in account; gates cart operations.
pub struct Shopper;

impl AccessPolicy for Shopper {
    const ALLOWED: &'static [Role] = Role::SHOPPERS;
    const UNAUTHENTICATED_MESSAGE: &'static str =
        "User must be logged in to access this functionality";
}

/// Admins only; gates catalog writes.
pub struct AdminOnly;

impl AccessPolicy for AdminOnly {
    const ALLOWED: &'static [Role] = Role::CATALOG_EDITORS;
    const UNAUTHENTICATED_MESSAGE: &'static str =
        "Admin must be logged in to access this functionality";
}

/// An authorized session, locked for the lifetime of the extractor.
pub struct Authorized<P: AccessPolicy> {
    pub identity: Identity,
    pub session: OwnedMutexGuard<SessionState>,
    _policy: PhantomData<P>,
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    P: AccessPolicy,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let current = CurrentSession::from_request_parts(parts, state).await?;
        let session = current.handle.lock_owned().await;

        let identity = match authorize(&session, P::ALLOWED) {
            Ok(identity) => identity.clone(),
            Err(AccessDenied::Unauthenticated) => {
                return Err(AppError::Unauthorized(P::UNAUTHENTICATED_MESSAGE));
            }
            Err(denied) => {
                tracing::info!(path = %parts.uri.path(), "access denied");
                return Err(denied.into());
            }
        };

        Ok(Self {
            identity,
            session,
            _policy: PhantomData,
        })
    }
}
