//! Cart route handlers.
//!
//! Every handler takes an [`Authorized<Shopper>`], which keeps the session
//! locked until the response is built.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use market_stall_core::ItemId;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::{Authorized, Shopper};
use crate::models::CartLine;
use crate::state::AppState;

/// Body naming the item to add or remove.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    #[serde(default)]
    pub item_id: Option<ItemId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAdded {
    pub message: &'static str,
    pub item: CartLine,
    pub cart_size: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRemoved {
    pub message: &'static str,
    pub cart_size: usize,
}

/// Add one unit of an item to the cart.
#[instrument(skip(state, auth), fields(username = %auth.identity.username))]
pub async fn add(
    State(state): State<AppState>,
    mut auth: Authorized<Shopper>,
    ApiJson(body): ApiJson<CartItemRequest>,
) -> Result<(StatusCode, Json<ItemAdded>)> {
    let item = state.cart().add_item(&mut auth.session, body.item_id).await?;
    let cart_size = auth.session.cart().len();

    tracing::info!(item_id = %item.id, cart_size, "item added to cart");

    Ok((
        StatusCode::CREATED,
        Json(ItemAdded {
            message: "Item added successfully",
            item,
            cart_size,
        }),
    ))
}

/// Remove one line for an item from the cart.
#[instrument(skip(state, auth), fields(username = %auth.identity.username))]
pub async fn remove(
    State(state): State<AppState>,
    mut auth: Authorized<Shopper>,
    ApiJson(body): ApiJson<CartItemRequest>,
) -> Result<Json<ItemRemoved>> {
    let line = state.cart().remove_item(&mut auth.session, body.item_id)?;
    let cart_size = auth.session.cart().len();

    tracing::info!(item_id = %line.id, cart_size, "item removed from cart");

    Ok(Json(ItemRemoved {
        message: "Item removed successfully",
        cart_size,
    }))
}

/// List the cart.
pub async fn list(State(state): State<AppState>, auth: Authorized<Shopper>) -> Json<Vec<CartLine>> {
    Json(state.cart().list_items(&auth.session))
}
