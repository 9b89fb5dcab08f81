//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span with an empty `request_id` field)
//! 3. Request ID (fills the span field, echoes the header)
//! 4. CORS
//! 5. Session (binds the request to a [`session::CurrentSession`])
//!
//! Handlers then use [`auth::Authorized`] to lock and check the session.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{AccessPolicy, AdminOnly, Authorized, Shopper};
pub use request_id::request_id_middleware;
pub use session::{CurrentSession, SESSION_COOKIE_NAME, session_middleware};
