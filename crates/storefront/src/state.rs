//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::identity::{HttpIdentityProvider, IdentityProvider};
use crate::services::CartService;
use crate::store::{DocumentStore, HttpDocumentStore};

/// Error constructing the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to build collaborator HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The document store and
/// identity service are held as capability objects rather than concrete
/// clients, so handlers and services can be exercised against in-memory
/// collaborators.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Create the production state with HTTP-backed collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator HTTP client cannot be constructed.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let store: Arc<dyn DocumentStore> = Arc::new(HttpDocumentStore::new(&config.docstore)?);
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(HttpIdentityProvider::new(&config.identity)?);

        Ok(Self::with_collaborators(config, store, identity))
    }

    /// Create state over explicit collaborators (used by tests).
    #[must_use]
    pub fn with_collaborators(
        config: StorefrontConfig,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                identity,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a handle to the document store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.store
    }

    /// Get a handle to the identity service.
    #[must_use]
    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.identity
    }

    /// Build a cart service over the document store.
    #[must_use]
    pub fn cart_service(&self) -> CartService {
        CartService::new(Arc::clone(&self.inner.store))
    }
}
