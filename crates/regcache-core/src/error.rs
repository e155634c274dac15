//! Error taxonomy for operations on the customer cache.
//!
//! Read paths (report, sync) degrade instead of failing, so most of these
//! only surface from write paths: flag changes and remote updates.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Registry unavailable: {0}")]
    RemoteUnavailable(#[source] ApiError),

    #[error("Cache file is corrupt: {0}")]
    CacheCorrupt(String),

    #[error("Customer not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to update customer in registry: {0}")]
    RemoteUpdateFailed(#[source] ApiError),
}

impl Error {
    /// True for errors caused by the caller rather than by the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
