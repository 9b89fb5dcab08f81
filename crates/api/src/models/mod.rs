//! Domain models for the service.
//!
//! Types here are plain data: storage lives in [`crate::store`], behavior in
//! [`crate::services`].

pub mod catalog;
pub mod session;
pub mod user;

pub use catalog::{Category, Item};
pub use session::{CartLine, Identity, SessionState};
pub use user::{User, UserView};
