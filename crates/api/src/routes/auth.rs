//! Login, logout and session status.

use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::CurrentSession;
use crate::middleware::session::{expired_session_cookie, session_cookie};
use crate::services::LoginOutcome;
use crate::services::auth::{AuthService, SessionStatus};
use crate::state::AppState;

/// Login body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub authenticated: bool,
    pub message: &'static str,
}

/// Report whether the calling session is logged in.
pub async fn status(current: CurrentSession) -> Json<SessionStatus> {
    Json(AuthService::status(&*current.lock().await))
}

/// Log the calling session in.
///
/// A successful login stores the session under a new ID and issues its cookie.
/// A session that is already logged in gets a success response without its
/// credentials being checked.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    current: CurrentSession,
    jar: CookieJar,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let mut session = current.lock().await;

    let outcome = state
        .auth()
        .login(
            &mut session,
            body.username.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    let (jar, message) = match outcome {
        LoginOutcome::LoggedIn(identity) => {
            let id = state
                .auth()
                .establish(current.id.as_ref(), &mut session)
                .await;

            set_sentry_user(identity.username.as_str());
            tracing::info!(username = %identity.username, role = %identity.role, "user logged in");
            (jar.add(session_cookie(&id, state.config())), "Login successful")
        }
        LoginOutcome::AlreadyLoggedIn => (jar, "Already logged in"),
    };

    Ok((
        jar,
        Json(LoginResponse {
            authenticated: true,
            message,
        }),
    ))
}

/// Discard the calling session.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentSession,
    jar: CookieJar,
) -> (CookieJar, Json<SessionStatus>) {
    let was_authenticated = current.lock().await.is_authenticated();

    state.auth().logout(current.id.as_ref()).await;
    clear_sentry_user();

    if was_authenticated {
        tracing::info!("user logged out");
    }

    (
        jar.remove(expired_session_cookie()),
        Json(SessionStatus {
            authenticated: false,
        }),
    )
}
