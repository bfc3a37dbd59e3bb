//! eShop web app library.
//!
//! Hosts the Northern Mountains chat concierge and the signed-in user's
//! order history. Exposed as a library so routes and the chat state machine
//! can be exercised with scripted completion providers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ai;
pub mod chatbot;
pub mod config;
pub mod error;
pub mod middleware;
pub mod ordering;
pub mod routes;
pub mod state;
