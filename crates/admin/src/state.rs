//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::QrLinkService;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    qr: QrLinkService,
}

impl AppState {
    /// Build state from configuration and a connection pool.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let qr = QrLinkService::new(&config.app_base_url, &config.qr);
        Self {
            inner: Arc::new(AppStateInner { config, pool, qr }),
        }
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// QR link builder.
    #[must_use]
    pub fn qr(&self) -> &QrLinkService {
        &self.inner.qr
    }
}
