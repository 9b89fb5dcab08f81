//! Item and category routes.
//!
//! Reads are public; writes need an admin session.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::{AdminOnly, Authorized};
use crate::models::{Category, Item};
use crate::services::NewItem;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewCategory {
    #[serde(default)]
    pub name: Option<String>,
}

pub async fn list_items(State(state): State<AppState>) -> Json<Vec<Item>> {
    Json(state.catalog_service().list_items().await)
}

/// Create an item.
#[instrument(skip(state, auth, body), fields(username = %auth.identity.username))]
pub async fn create_item(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    ApiJson(body): ApiJson<NewItem>,
) -> Result<(StatusCode, Json<Item>)> {
    // The session lock is not needed past authorization
    drop(auth);

    let item = state.catalog_service().create_item(body).await?;
    tracing::info!(item_id = %item.id, name = %item.name, "item created");

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.catalog_service().list_categories().await)
}

/// Create a category.
#[instrument(skip(state, auth, body), fields(username = %auth.identity.username))]
pub async fn create_category(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    ApiJson(body): ApiJson<NewCategory>,
) -> Result<(StatusCode, Json<Category>)> {
    drop(auth);

    let category = state.catalog_service().create_category(body.name).await?;
    tracing::info!(category_id = %category.id, name = %category.name, "category created");

    Ok((StatusCode::CREATED, Json(category)))
}
