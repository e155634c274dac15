use std::sync::Arc;

use regcache_core::{ApiClient, CacheManager};

/// Shared handles for request handlers.
///
/// The cache store is not locked: concurrent mutating requests race on the
/// cache file and the last save wins.
#[derive(Clone)]
pub struct AppState {
    pub client: ApiClient,
    pub store: Arc<CacheManager>,
}

impl AppState {
    pub fn new(client: ApiClient, store: CacheManager) -> Self {
        Self {
            client,
            store: Arc::new(store),
        }
    }
}
