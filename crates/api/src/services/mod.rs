//! Business logic services.
//!
//! # Services
//!
//! - `access` - Role checks against a session's identity
//! - `auth` - Registration, password login, logout
//! - `cart` - Session cart operations backed by the catalog
//! - `catalog` - Validated item and category creation
//!
//! Services borrow the stores they need from [`crate::state::AppState`] and are
//! built per request, so they hold no state of their own.

pub mod access;
pub mod auth;
pub mod cart;
pub mod catalog;

pub use access::{AccessDenied, authorize};
pub use auth::{Argon2Hasher, AuthError, AuthService, CredentialHasher, LoginOutcome};
pub use cart::{CartError, CartService};
pub use catalog::{CatalogError, CatalogService, NewItem};
