//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{ListingConfig, WebConfig};
use crate::db::TaxiStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the entity store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    store: Box<dyn TaxiStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Web configuration
    /// * `store` - Entity store (`PgStore` or `InMemoryStore`)
    #[must_use]
    pub fn new(config: WebConfig, store: impl TaxiStore + 'static) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store: Box::new(store),
            }),
        }
    }

    /// Get a reference to the list view settings.
    #[must_use]
    pub fn listing(&self) -> &ListingConfig {
        &self.inner.config.listing
    }

    /// Get a reference to the entity store.
    #[must_use]
    pub fn store(&self) -> &dyn TaxiStore {
        self.inner.store.as_ref()
    }
}
