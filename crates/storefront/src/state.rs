//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::commerce::CommerceClient;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources: configuration, the session-store pool, and the
/// commerce API client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    commerce: CommerceClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let commerce = CommerceClient::new(&config.commerce);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                commerce,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the session-store connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the commerce API client.
    #[must_use]
    pub fn commerce(&self) -> &CommerceClient {
        &self.inner.commerce
    }
}
