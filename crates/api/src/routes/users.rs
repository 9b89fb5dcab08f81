//! User account routes.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::CurrentSession;
use crate::models::UserView;
use crate::state::AppState;

/// Registration body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Omitted for a regular account, or `"admin"`.
    #[serde(default)]
    pub role: Option<String>,
}

/// List all accounts.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Json<Vec<UserView>> {
    Json(state.users().list().await)
}

/// Register a new account.
///
/// Anyone may register a `user`. Registering an `admin` requires the calling
/// session to belong to an admin.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    current: CurrentSession,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserView>)> {
    let caller = current.lock().await.identity().cloned();

    let view = state
        .auth()
        .register(
            body.username.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
            body.role.as_deref(),
            caller.as_ref(),
        )
        .await?;

    tracing::info!(username = %view.username, role = %view.role, "user registered");

    Ok((StatusCode::CREATED, Json(view)))
}
