//! eShop application host.
//!
//! Declares the resources that make up the eShop deployment (databases,
//! services, external AI accounts), wires their endpoints and connection
//! strings together, and publishes the result as a manifest for an
//! orchestrator to run.
//!
//! ```rust
//! use eshop_apphost::{EshopOptions, ManifestFormat, eshop};
//!
//! let app = eshop(EshopOptions::default()).expect("topology builds");
//! let manifest = app.render(ManifestFormat::Json).expect("manifest renders");
//! assert!(manifest.contains("{identity-api.bindings.https.url}"));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod builder;
pub mod error;
pub mod manifest;
pub mod model;
pub mod topology;

pub use builder::{DistributedApplication, DistributedApplicationBuilder, ResourceHandle};
pub use error::AppHostError;
pub use manifest::{Manifest, ManifestFormat};
pub use model::{EndpointReference, EnvValue, Resource, ResourceKind};
pub use topology::{EshopOptions, OpenAiSource, eshop, should_use_http_endpoints};
