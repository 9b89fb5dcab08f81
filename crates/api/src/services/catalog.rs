//! Catalog administration.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use market_stall_core::Price;

use crate::models::{Category, Item};
use crate::store::Catalog;
use crate::store::catalog::ItemDraft;

/// Errors from catalog writes.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),
}

/// Fields accepted when creating an item.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub in_stock: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Catalog service.
pub struct CatalogService<'a> {
    catalog: &'a Catalog,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub async fn list_items(&self) -> Vec<Item> {
        self.catalog.list_items().await
    }

    pub async fn list_categories(&self) -> Vec<Category> {
        self.catalog.list_categories().await
    }

    /// Validate and store a new item.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the name, description or price is
    /// missing, or if the price or stock is negative.
    pub async fn create_item(&self, input: NewItem) -> Result<Item, CatalogError> {
        let name = required_text(input.name)
            .ok_or_else(|| validation("All item fields are required"))?;
        let description = required_text(input.description)
            .ok_or_else(|| validation("All item fields are required"))?;
        let price = input
            .price
            .ok_or_else(|| validation("All item fields are required"))?;

        let price =
            Price::new(price).map_err(|_| validation("Price and inStock must be non-negative"))?;
        let in_stock = input.in_stock.unwrap_or(0);
        if in_stock < 0 {
            return Err(validation("Price and inStock must be non-negative"));
        }

        let draft = ItemDraft {
            name,
            description,
            price,
            in_stock,
            category: input
                .category
                .map(|c| c.trim().to_owned())
                .unwrap_or_default(),
        };

        Ok(self.catalog.insert_item(draft).await)
    }

    /// Validate and store a new category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the name is missing or blank.
    pub async fn create_category(&self, name: Option<String>) -> Result<Category, CatalogError> {
        let name = required_text(name).ok_or_else(|| validation("Category name is required"))?;
        Ok(self.catalog.insert_category(name).await)
    }
}

fn required_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn validation(message: &str) -> CatalogError {
    CatalogError::Validation(message.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use market_stall_core::ItemId;

    use super::*;
    use crate::models::catalog::DEFAULT_CATEGORY;

    fn lamp() -> NewItem {
        NewItem {
            name: Some("Lamp".to_string()),
            description: Some("Brass desk lamp".to_string()),
            price: Some(Decimal::new(4_200, 2)),
            in_stock: Some(2),
            category: None,
        }
    }

    #[tokio::test]
    async fn test_create_item_assigns_next_id_and_default_category() {
        let catalog = Catalog::demo();
        let service = CatalogService::new(&catalog);

        let item = service.create_item(lamp()).await.unwrap();

        assert_eq!(item.id, ItemId::new(4));
        assert_eq!(item.category, DEFAULT_CATEGORY);
        assert_eq!(service.list_items().await.len(), 4);
    }

    #[tokio::test]
    async fn test_create_item_requires_fields() {
        let catalog = Catalog::new();
        let service = CatalogService::new(&catalog);

        let missing_price = NewItem {
            price: None,
            ..lamp()
        };
        assert!(service.create_item(missing_price).await.is_err());

        let blank_name = NewItem {
            name: Some("  ".to_string()),
            ..lamp()
        };
        assert!(service.create_item(blank_name).await.is_err());
        assert!(service.list_items().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_item_rejects_negative_values() {
        let catalog = Catalog::new();
        let service = CatalogService::new(&catalog);

        let negative_price = NewItem {
            price: Some(Decimal::new(-1, 0)),
            ..lamp()
        };
        let CatalogError::Validation(message) =
            service.create_item(negative_price).await.unwrap_err();
        assert_eq!(message, "Price and inStock must be non-negative");

        let negative_stock = NewItem {
            in_stock: Some(-3),
            ..lamp()
        };
        assert!(service.create_item(negative_stock).await.is_err());
    }

    #[test]
    fn test_new_item_accepts_numeric_price() {
        let input: NewItem = serde_json::from_str(
            r#"{"name":"Mug","description":"Stoneware","price":12.5,"inStock":7}"#,
        )
        .unwrap();
        assert_eq!(input.price, Some(Decimal::new(125, 1)));
        assert_eq!(input.in_stock, Some(7));
        assert!(input.category.is_none());
    }

    #[tokio::test]
    async fn test_create_category() {
        let catalog = Catalog::demo();
        let service = CatalogService::new(&catalog);

        let category = service
            .create_category(Some("garden".to_string()))
            .await
            .unwrap();
        assert_eq!(category.name, "garden");
        assert_eq!(service.list_categories().await.len(), 3);

        assert!(service.create_category(None).await.is_err());
    }
}
