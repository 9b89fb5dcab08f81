//! Session binding.
//!
//! [`session_middleware`] resolves the `ms_session` cookie to a live session,
//! or to a transient anonymous state, and puts it in the request extensions as
//! a [`CurrentSession`]. The middleware never writes the cookie: login issues
//! it for the session it establishes and logout removes it.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tokio::sync::MutexGuard;

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::models::SessionState;
use crate::state::AppState;
use crate::store::{SessionHandle, SessionId};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "ms_session";

/// The session bound to the current request.
#[derive(Clone)]
pub struct CurrentSession {
    /// `None` until a login stores the session.
    pub id: Option<SessionId>,
    pub handle: SessionHandle,
}

impl CurrentSession {
    /// Lock the session for reading or mutation.
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.handle.lock().await
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session middleware not installed".to_owned()))
    }
}

/// Middleware that binds every request to a session.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = jar
        .get(SESSION_COOKIE_NAME)
        .and_then(|cookie| SessionId::parse(cookie.value()));

    let resolved = state.sessions().resolve(presented.as_ref()).await;

    request.extensions_mut().insert(CurrentSession {
        id: resolved.id,
        handle: resolved.handle,
    });

    next.run(request).await
}

/// Build the cookie that carries a session ID.
pub(crate) fn session_cookie(id: &SessionId, config: &ApiConfig) -> Cookie<'static> {
    let max_age = time::Duration::try_from(config.session.ttl).unwrap_or(time::Duration::DAY);

    Cookie::build((SESSION_COOKIE_NAME, id.as_str().to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.environment.secure_cookies())
        .max_age(max_age)
        .build()
}

/// Cookie that tells the browser to drop its session ID.
#[must_use]
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build()
}
