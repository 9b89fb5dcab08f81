//! Cart operations.
//!
//! The cart lives inside the session, so every operation takes the caller's
//! locked [`SessionState`]. Access control has already run by the time these
//! are called.

use thiserror::Error;

use market_stall_core::ItemId;

use crate::models::{CartLine, SessionState};
use crate::store::Catalog;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Missing or non-positive item ID.
    #[error("{0}")]
    Validation(String),

    /// The catalog has no such item.
    #[error("Item not found")]
    ItemNotFound,

    /// The item exists but has no stock.
    #[error("Item is out of stock")]
    OutOfStock,

    /// The cart holds no line for the item.
    #[error("Item not found in cart")]
    NotInCart,
}

/// Cart service.
pub struct CartService<'a> {
    catalog: &'a Catalog,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Add one unit of an item to the cart.
    ///
    /// The line is a snapshot of the item as it is now. Catalog stock is not
    /// reserved.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` if `item_id` is missing or not positive,
    /// `CartError::ItemNotFound` if the catalog lacks it, and
    /// `CartError::OutOfStock` if it has no stock.
    pub async fn add_item(
        &self,
        session: &mut SessionState,
        item_id: Option<ItemId>,
    ) -> Result<CartLine, CartError> {
        let item_id = require_item_id(item_id)?;

        let item = self
            .catalog
            .get_item(item_id)
            .await
            .ok_or(CartError::ItemNotFound)?;

        if !item.is_available() {
            return Err(CartError::OutOfStock);
        }

        let line = CartLine::from(&item);
        session.push_line(line.clone());
        Ok(line)
    }

    /// Remove the first cart line for an item.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` if `item_id` is missing or not positive,
    /// and `CartError::NotInCart` if no line matches.
    pub fn remove_item(
        &self,
        session: &mut SessionState,
        item_id: Option<ItemId>,
    ) -> Result<CartLine, CartError> {
        let item_id = require_item_id(item_id)?;
        session.remove_first(item_id).ok_or(CartError::NotInCart)
    }

    /// Cart contents in insertion order.
    #[must_use]
    pub fn list_items(&self, session: &SessionState) -> Vec<CartLine> {
        session.cart().to_vec()
    }
}

fn require_item_id(item_id: Option<ItemId>) -> Result<ItemId, CartError> {
    item_id
        .filter(|id| id.is_positive())
        .ok_or_else(|| CartError::Validation("Item ID is required".to_owned()))
}
