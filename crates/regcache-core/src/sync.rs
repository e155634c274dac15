//! Reconciliation of the local cache against the registry.
//!
//! The cache is considered stale when it holds fewer customers than the
//! registry reports. That is only a proxy: remote edits to existing records,
//! deletions, and count drift from filtering all go unnoticed.

use tracing::info;

use crate::api::ApiClient;
use crate::cache::CacheManager;
use crate::models::CustomerCache;

/// Result of one reconciliation pass
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub cache: CustomerCache,
    /// The reconciled cache differs from the one passed in
    pub updated: bool,
    /// Records returned by the full fetch (0 when no fetch ran)
    pub fetched: usize,
    pub remote_total: u64,
}

pub fn is_stale(cache: &CustomerCache, remote_total: u64) -> bool {
    (cache.len() as u64) < remote_total
}

/// Bring `cache` up to date with the registry.
///
/// When stale, every customer is fetched again and merged over the cache
/// (fetched records replace cached ones wholesale) and the result is saved.
/// Remote failures only shrink what gets merged; they never fail the call.
pub async fn reconcile(cache: CustomerCache, client: &ApiClient, store: &CacheManager) -> SyncOutcome {
    let remote_total = client.fetch_total_count().await;

    if !is_stale(&cache, remote_total) {
        info!(cached = cache.len(), remote_total, "Customer cache is up to date");
        return SyncOutcome {
            cache,
            updated: false,
            fetched: 0,
            remote_total,
        };
    }

    info!(cached = cache.len(), remote_total, "Customer cache is stale, fetching all customers");
    let fetched = client.fetch_all().await;
    let fetched_count = fetched.len();

    let mut merged = cache.clone();
    merged.merge(fetched);
    let updated = merged != cache;
    store.save(&merged);

    info!(
        fetched = fetched_count,
        cached = merged.len(),
        updated,
        "Customer cache reconciled"
    );

    SyncOutcome {
        cache: merged,
        updated,
        fetched: fetched_count,
        remote_total,
    }
}

/// Load the persisted cache and reconcile it
pub async fn check_for_updates(client: &ApiClient, store: &CacheManager) -> SyncOutcome {
    reconcile(store.load(), client, store).await
}
