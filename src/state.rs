use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::Store;
use crate::middleware::RateLimiter;
use crate::storage::ObjectStore;

/// Shared application state, created once at startup and handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub objects: Arc<dyn ObjectStore>,
    pub tokens: TokenIssuer,
    pub config: Arc<AppConfig>,
    /// `None` when rate limiting is disabled.
    pub rate_limiter: Option<RateLimiter>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>, objects: Arc<dyn ObjectStore>) -> Self {
        let rate_limiter = config.api.enable_rate_limiting.then(|| {
            RateLimiter::new(
                config.api.rate_limit_requests,
                Duration::from_secs(config.api.rate_limit_window_secs),
            )
        });
        Self {
            store,
            objects,
            tokens: TokenIssuer::from_config(&config.security),
            config: Arc::new(config),
            rate_limiter,
        }
    }
}
