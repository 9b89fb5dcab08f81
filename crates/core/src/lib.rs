//! Market Stall Core - Shared types library.
//!
//! This crate provides common types used across the Market Stall components:
//! - `api` - The JSON HTTP service (accounts, catalog, session carts)
//! - `integration-tests` - End-to-end scenarios against a running service
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage, no HTTP. This
//! keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, usernames, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
