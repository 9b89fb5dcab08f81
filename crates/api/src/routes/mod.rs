//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Accounts
//! GET  /users                  - List accounts (no password hashes)
//! POST /users                  - Register (admin role needs an admin session)
//!
//! # Session
//! GET  /session                - {authenticated}
//! POST /login                  - Password login
//! POST /logout                 - Destroy the session
//!
//! # Cart (user or admin)
//! POST /addmyitem              - Add an item by ID
//! POST /removeitem             - Remove one line for an item
//! GET  /myitems                - Cart contents
//! GET  /cart                   - Alias of /myitems
//!
//! # Catalog
//! GET  /items                  - List items
//! POST /items                  - Create item (admin)
//! GET  /categories             - List categories
//! POST /categories             - Create category (admin)
//! ```
//!
//! `/health` is mounted separately in [`crate::app`] so probes skip session
//! lookup.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the account and session routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list).post(users::register))
        .route("/session", get(auth::status))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/addmyitem", post(cart::add))
        .route("/removeitem", post(cart::remove))
        .route("/myitems", get(cart::list))
        .route("/cart", get(cart::list))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(catalog::list_items).post(catalog::create_item))
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
}

/// Create all session-bound routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(cart_routes())
        .merge(catalog_routes())
}
