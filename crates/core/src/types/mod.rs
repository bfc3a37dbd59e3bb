//! Core types for eShop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod claims;
pub mod id;
pub mod status;

pub use claims::{ClaimKey, UserProfileClaims};
pub use id::*;
pub use status::*;
