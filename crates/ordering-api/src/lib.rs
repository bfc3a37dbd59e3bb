//! eShop ordering API library.
//!
//! Read-only order projections and card types over `PostgreSQL`, exposed
//! under `/api/v1/orders`. Exposed as a library so the router can be
//! exercised against in-memory query and identity fakes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod queries;
pub mod routes;
pub mod state;
