//! Session-related types.
//!
//! A session is anonymous until login stores an [`Identity`] in it. The
//! authenticated flag is derived from the identity, so a session can never
//! claim to be authenticated without knowing who it belongs to.

use chrono::{DateTime, Utc};
use serde::Serialize;

use market_stall_core::{ItemId, Price, Role, Username};

use super::Item;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Login name of the account.
    pub username: Username,
    /// Role at the time of login.
    pub role: Role,
}

/// One snapshot of an item recorded in a cart.
///
/// Later catalog changes do not affect lines already in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Stock level when the line was added.
    pub in_stock: i64,
    pub category: String,
}

impl From<&Item> for CartLine {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            in_stock: item.in_stock,
            category: item.category.clone(),
        }
    }
}

/// Server-side state for one client session.
#[derive(Debug, Clone)]
pub struct SessionState {
    identity: Option<Identity>,
    cart: Vec<CartLine>,
    created_at: DateTime<Utc>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// A fresh anonymous session with an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            identity: None,
            cart: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// The logged-in identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Record a successful login.
    pub fn sign_in(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Lines currently in the cart, in insertion order.
    #[must_use]
    pub fn cart(&self) -> &[CartLine] {
        &self.cart
    }

    /// Append a line to the cart.
    pub(crate) fn push_line(&mut self, line: CartLine) {
        self.cart.push(line);
    }

    /// Remove the first line for `item_id`, returning it.
    pub(crate) fn remove_first(&mut self, item_id: ItemId) -> Option<CartLine> {
        let index = self.cart.iter().position(|line| line.id == item_id)?;
        Some(self.cart.remove(index))
    }

    /// When the session was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i64, name: &str) -> CartLine {
        CartLine {
            id: ItemId::new(id),
            name: name.to_string(),
            description: String::new(),
            price: Price::ZERO,
            in_stock: 1,
            category: "uncategorized".to_string(),
        }
    }

    #[test]
    fn test_new_session_is_anonymous_and_empty() {
        let state = SessionState::new();
        assert!(!state.is_authenticated());
        assert!(state.identity().is_none());
        assert!(state.cart().is_empty());
    }

    #[test]
    fn test_sign_in_sets_identity() {
        let mut state = SessionState::new();
        state.sign_in(Identity {
            username: Username::parse("alice").unwrap(),
            role: Role::User,
        });

        assert!(state.is_authenticated());
        assert_eq!(state.identity().unwrap().username.as_str(), "alice");
    }

    #[test]
    fn test_remove_first_only_removes_one_match() {
        let mut state = SessionState::new();
        state.push_line(line(1, "first"));
        state.push_line(line(2, "other"));
        state.push_line(line(1, "second"));

        let removed = state.remove_first(ItemId::new(1)).unwrap();

        assert_eq!(removed.name, "first");
        let names: Vec<_> = state.cart().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["other", "second"]);
    }

    #[test]
    fn test_remove_first_missing() {
        let mut state = SessionState::new();
        state.push_line(line(1, "only"));
        assert!(state.remove_first(ItemId::new(9)).is_none());
        assert_eq!(state.cart().len(), 1);
    }
}
