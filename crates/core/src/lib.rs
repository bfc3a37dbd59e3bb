//! eShop Core - Shared types library.
//!
//! This crate provides common types used across the eShop components:
//! - `ordering-api` - Orders REST API backed by `PostgreSQL`
//! - `webapp` - Web front-end hosting the chat concierge
//! - `apphost` - Distributed application descriptor
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, order statuses, chat roles and identity claims
//! - [`identity`] - Bearer token validation (with the `jwt` feature)

#![cfg_attr(not(test), forbid(unsafe_code))]

#[cfg(feature = "jwt")]
pub mod identity;
pub mod types;

pub use types::*;
