//! Application state shared across handlers.

use std::sync::Arc;

use crate::identity::IdentityService;
use crate::queries::OrderQueries;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Collaborators are trait objects so the
/// router can run against in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    queries: Arc<dyn OrderQueries>,
    identity: Arc<dyn IdentityService>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(queries: Arc<dyn OrderQueries>, identity: Arc<dyn IdentityService>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { queries, identity }),
        }
    }

    /// Get the order query service.
    #[must_use]
    pub fn queries(&self) -> &dyn OrderQueries {
        self.inner.queries.as_ref()
    }

    /// Get the identity service.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityService {
        self.inner.identity.as_ref()
    }
}
