//! Data models for registry customers.
//!
//! - `CustomerRecord`: one customer as sent by the registry, with passthrough fields
//! - `CustomerCache`: the id-keyed local mirror persisted to disk
//! - `ExpirationEntry`, `ExpirationStatus`: derived expiration report rows

pub mod customer;
pub mod report;

pub use customer::{CustomerCache, CustomerRecord};
pub use report::{ExpirationEntry, ExpirationStatus};
