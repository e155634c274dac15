//! Core library for regcache.
//!
//! Mirrors a paginated customer registry into a local JSON cache and derives
//! expiration views from it:
//!
//! - [`api`]: registry client (paged listing, totals, filtered queries, updates)
//! - [`cache`]: whole-file persistence of the id-keyed cache
//! - [`sync`]: staleness check and remote-wins merge
//! - [`expiration`]: two-year expiration report
//! - [`flags`]: manual exclusion flags and modification bumps

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod expiration;
pub mod filter;
pub mod flags;
pub mod models;
pub mod sync;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use cache::CacheManager;
pub use config::{Config, RegistryConfig};
pub use error::{Error, Result};
pub use filter::DateFilter;
pub use models::{CustomerCache, CustomerRecord, ExpirationEntry, ExpirationStatus};
pub use sync::SyncOutcome;
