//! REST client for the remote customer registry.
//!
//! This module provides the `ApiClient` for reading paginated customer
//! listings and pushing partial updates back to the registry.
//!
//! The registry authenticates every request with two static header tokens
//! (`access-token` and `secret-access-token`) taken from `RegistryConfig`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
