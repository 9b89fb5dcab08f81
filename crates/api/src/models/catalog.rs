//! Catalog types.

use serde::Serialize;

use market_stall_core::{CategoryId, ItemId, Price};

/// Category assigned to items created without one.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// A product for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Units on hand; zero or less means the item cannot be added to a cart.
    pub in_stock: i64,
    pub category: String,
}

impl Item {
    /// Whether at least one unit is on hand.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.in_stock > 0
    }
}

/// A named grouping of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
