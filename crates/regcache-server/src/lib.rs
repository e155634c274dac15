//! HTTP shell around `regcache-core`.
//!
//! Routes only translate requests into core calls and render what comes back;
//! all sync, expiration and flag semantics live in the core crate.

#![forbid(unsafe_code)]

mod handlers;
mod html;
mod state;

use axum::routing::{get, post};
use axum::Router;

pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::report_page))
        .route("/flagged", get(handlers::flagged_page))
        .route("/registry", get(handlers::registry_page))
        .route("/customers/flagged", get(handlers::flagged_customers))
        .route("/customers/expiring", get(handlers::expiring_customers))
        .route("/customers/expiring/:id/flag", post(handlers::set_flag))
        .route("/customers/flagged/:id/clear", post(handlers::clear_flag))
        .route("/customers/expiring/:id/touch", post(handlers::mark_modified))
        .route("/sync/check", get(handlers::check_updates))
        .with_state(state)
}
