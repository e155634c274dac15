//! Manual exclusion flags and modification bumps.
//!
//! Every mutation here checks the id first, changes the in-memory cache, and
//! then persists the whole cache. A failed check or remote call leaves both
//! the cache and the file untouched.

use chrono::{Local, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::info;

use crate::api::ApiClient;
use crate::cache::CacheManager;
use crate::error::{Error, Result};
use crate::models::CustomerCache;
use crate::utils::{format_remote_datetime, parse_remote_datetime};

/// Registry field holding the last modification timestamp
const MODIFICATION_FIELD: &str = "data_mod_cliente";

/// Exclude a customer from expiration tracking
pub fn set_flag(cache: &mut CustomerCache, store: &CacheManager, id: &str) -> Result<()> {
    let record = cache
        .get_mut(id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    record.flag = Some(true);
    info!(id = %id, "Flag set");

    store.save(cache);
    Ok(())
}

/// Remove the flag attribute entirely, making the customer eligible again
pub fn clear_flag(cache: &mut CustomerCache, store: &CacheManager, id: &str) -> Result<()> {
    let record = cache
        .get_mut(id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    record.flag = None;
    info!(id = %id, "Flag cleared");

    store.save(cache);
    Ok(())
}

pub fn is_flagged(cache: &CustomerCache, id: &str) -> Option<bool> {
    cache.get(id).map(|r| r.is_flagged())
}

/// Bump a customer's modification date, optionally through the registry.
///
/// With `update_remote`, the registry is asked to set the modification date to
/// now and the date it reports back is adopted locally. Returns the adopted
/// date, or `None` when nothing was sent upstream.
pub async fn mark_modified(
    cache: &mut CustomerCache,
    store: &CacheManager,
    client: &ApiClient,
    id: &str,
    update_remote: bool,
) -> Result<Option<NaiveDateTime>> {
    mark_modified_at(cache, store, client, id, update_remote, Local::now().naive_local()).await
}

pub async fn mark_modified_at(
    cache: &mut CustomerCache,
    store: &CacheManager,
    client: &ApiClient,
    id: &str,
    update_remote: bool,
    now: NaiveDateTime,
) -> Result<Option<NaiveDateTime>> {
    if !cache.contains(id) {
        return Err(Error::NotFound(id.to_string()));
    }

    let mut adopted = None;
    if update_remote {
        let mut fields = Map::new();
        fields.insert(
            MODIFICATION_FIELD.to_string(),
            Value::String(format_remote_datetime(&now)),
        );

        let updated = client
            .update_record_remote(id, &fields)
            .await
            .map_err(Error::RemoteUpdateFailed)?;

        // Fall back to the timestamp we sent if the registry echoes nothing usable
        let modified = updated
            .get(MODIFICATION_FIELD)
            .and_then(Value::as_str)
            .and_then(parse_remote_datetime)
            .unwrap_or(now);

        let record = cache
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        record.modification_date = Some(modified);
        info!(id = %id, modified = %modified, "Modification date updated in registry");
        adopted = Some(modified);
    }

    store.save(cache);
    Ok(adopted)
}
