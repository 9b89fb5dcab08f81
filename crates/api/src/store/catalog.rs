//! Catalog storage: items and categories.

use rust_decimal::Decimal;
use tokio::sync::RwLock;

use market_stall_core::{CategoryId, ItemId, Price};

use crate::models::catalog::{Category, DEFAULT_CATEGORY, Item};

/// Fields for a new item; the catalog assigns the ID.
#[derive(Debug, Clone)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub in_stock: i64,
    pub category: String,
}

/// In-memory catalog.
#[derive(Default)]
pub struct Catalog {
    items: RwLock<Vec<Item>>,
    categories: RwLock<Vec<Category>>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-filled with items and categories.
    #[must_use]
    pub fn with_contents(items: Vec<Item>, categories: Vec<Category>) -> Self {
        Self {
            items: RwLock::new(items),
            categories: RwLock::new(categories),
        }
    }

    /// A small starter catalog so a fresh server has something to sell.
    #[must_use]
    pub fn demo() -> Self {
        let categories = vec![
            Category {
                id: CategoryId::new(1),
                name: "stationery".to_string(),
            },
            Category {
                id: CategoryId::new(2),
                name: "kitchen".to_string(),
            },
        ];

        let item = |id: i64, name: &str, description: &str, cents: i64, in_stock: i64, category: &str| Item {
            id: ItemId::new(id),
            name: name.to_string(),
            description: description.to_string(),
            price: Price::new(Decimal::new(cents, 2)).unwrap_or(Price::ZERO),
            in_stock,
            category: category.to_string(),
        };

        let items = vec![
            item(1, "Notebook", "A5 dotted notebook, 120 pages", 1_000, 10, "stationery"),
            item(2, "Fountain pen", "Steel nib, medium", 2_450, 4, "stationery"),
            item(3, "Tea towel", "Linen, natural", 899, 0, "kitchen"),
        ];

        Self::with_contents(items, categories)
    }

    /// Look up an item by ID.
    pub async fn get_item(&self, id: ItemId) -> Option<Item> {
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// All items in creation order.
    pub async fn list_items(&self) -> Vec<Item> {
        self.items.read().await.clone()
    }

    /// Store a new item under the next free ID (max existing + 1).
    pub async fn insert_item(&self, draft: ItemDraft) -> Item {
        let mut items = self.items.write().await;
        let id = items
            .iter()
            .map(|item| item.id)
            .max()
            .map_or(ItemId::FIRST, |max| max.next());

        let item = Item {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            in_stock: draft.in_stock,
            category: if draft.category.is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                draft.category
            },
        };
        items.push(item.clone());
        item
    }

    /// All categories in creation order.
    pub async fn list_categories(&self) -> Vec<Category> {
        self.categories.read().await.clone()
    }

    /// Store a new category under the next free ID (max existing + 1).
    pub async fn insert_category(&self, name: String) -> Category {
        let mut categories = self.categories.write().await;
        let id = categories
            .iter()
            .map(|category| category.id)
            .max()
            .map_or(CategoryId::FIRST, |max| max.next());

        let category = Category { id, name };
        categories.push(category.clone());
        category
    }
}
