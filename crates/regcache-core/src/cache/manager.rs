use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::error::Error;
use crate::models::CustomerCache;

/// Whole-file JSON store for the customer cache.
///
/// Every load reads the complete file and every save rewrites it. There is no
/// locking: two overlapping load-modify-save sequences race and the last save
/// wins.
pub struct CacheManager {
    path: PathBuf,
}

impl CacheManager {
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create cache directory: {}", parent.display())
                })?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache file. `Ok(None)` when no file exists yet.
    pub fn try_load(&self) -> Result<Option<CustomerCache>, Error> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::CacheCorrupt(format!("{}: {}", self.path.display(), e)))?;

        let cache: CustomerCache = serde_json::from_str(&contents)
            .map_err(|e| Error::CacheCorrupt(format!("{}: {}", self.path.display(), e)))?;

        Ok(Some(cache))
    }

    /// Read the cache file, falling back to an empty cache.
    ///
    /// A corrupt or unreadable file is reported as a warning and otherwise
    /// treated exactly like a missing one; the next save overwrites it.
    pub fn load(&self) -> CustomerCache {
        match self.try_load() {
            Ok(Some(cache)) => {
                debug!(count = cache.len(), "Loaded customer cache");
                cache
            }
            Ok(None) => {
                debug!(path = %self.path.display(), "No cache file, starting empty");
                CustomerCache::new()
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable customer cache");
                CustomerCache::new()
            }
        }
    }

    pub fn try_save(&self, cache: &CustomerCache) -> Result<()> {
        let contents = serde_json::to_string_pretty(cache)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))?;
        Ok(())
    }

    /// Persist the cache. Failures are logged and swallowed.
    pub fn save(&self, cache: &CustomerCache) {
        match self.try_save(cache) {
            Ok(()) => debug!(count = cache.len(), "Saved customer cache"),
            Err(e) => error!(error = %format!("{:#}", e), "Failed to save customer cache"),
        }
    }

    /// When the cache file was last written
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        let modified = std::fs::metadata(&self.path).and_then(|m| m.modified()).ok()?;
        Some(DateTime::<Utc>::from(modified))
    }

    pub fn age_display(&self) -> String {
        match self.last_saved() {
            Some(saved) => age_display(saved, Utc::now()),
            None => "never".to_string(),
        }
    }
}

/// Human-readable age of a timestamp relative to `now`
pub fn age_display(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomerRecord;
    use chrono::Duration;
    use tempfile::tempdir;

    fn sample_cache() -> CustomerCache {
        vec![CustomerRecord::new("1", "Acme"), CustomerRecord::new("2", "Globex")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().expect("tempdir");
        let store = CacheManager::new(dir.path().join("cache.json")).expect("store");
        assert!(store.try_load().expect("load").is_none());
        assert!(store.load().is_empty());
        assert_eq!(store.age_display(), "never");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().expect("tempdir");
        let store = CacheManager::new(dir.path().join("nested").join("cache.json")).expect("store");
        let cache = sample_cache();

        store.save(&cache);

        assert_eq!(store.load(), cache);
        assert_eq!(store.age_display(), "just now");
    }

    #[test]
    fn test_corrupt_file_loads_as_empty() {
        // Silent recovery loses whatever the file held; try_load still reports it.
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ \"1\": { \"id_cliente\": ").expect("write");
        let store = CacheManager::new(path).expect("store");

        assert!(matches!(store.try_load(), Err(Error::CacheCorrupt(_))));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let dir = tempdir().expect("tempdir");
        // A directory where the file should be makes the write fail
        let path = dir.path().join("cache.json");
        std::fs::create_dir_all(&path).expect("mkdir");
        let store = CacheManager::new(path).expect("store");

        assert!(store.try_save(&sample_cache()).is_err());
        store.save(&sample_cache());
    }

    #[test]
    fn test_age_display() {
        let now = Utc::now();
        assert_eq!(age_display(now, now), "just now");
        assert_eq!(age_display(now + Duration::minutes(5), now), "just now");
        assert_eq!(age_display(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(age_display(now - Duration::minutes(90), now), "2h ago");
        assert_eq!(age_display(now - Duration::minutes(70), now), "1h ago");
        assert_eq!(age_display(now - Duration::hours(40), now), "2d ago");
        assert_eq!(age_display(now - Duration::hours(30), now), "1d ago");
    }
}
