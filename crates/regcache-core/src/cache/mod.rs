//! Local on-disk mirror of the customer registry.
//!
//! This module provides the `CacheManager`, which persists the whole
//! `CustomerCache` as a single pretty-printed JSON object keyed by customer id.
//! Loads never fail: a missing or unreadable file yields an empty cache.

pub mod manager;

pub use manager::CacheManager;
