use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::Local;
use regcache_core::{expiration, flags, sync, CustomerRecord, DateFilter, Error, ExpirationEntry};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::html;
use crate::state::AppState;

/// Body of every mutating endpoint
#[derive(Debug, Serialize)]
pub(crate) struct ActionResponse {
    success: bool,
    message: String,
}

impl ActionResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SyncCheckResponse {
    updated: bool,
    message: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TouchRequest {
    #[serde(default)]
    update_remote: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RegistryQuery {
    data_cadastro: Option<String>,
    data_modificacao: Option<String>,
}

/// Core error rendered as `{ success: false, message }`
pub(crate) struct ApiFailure(Error);

impl From<Error> for ApiFailure {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::RemoteUpdateFailed(_) | Error::RemoteUnavailable(_) | Error::CacheCorrupt(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if self.0.is_client_error() {
            warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        } else {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        }
        let body = ActionResponse {
            success: false,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ===== Pages =====

pub(crate) async fn report_page(State(state): State<AppState>) -> Html<String> {
    let outcome = sync::check_for_updates(&state.client, &state.store).await;
    let entries = expiration::compute_report(&outcome.cache);
    Html(html::report_page(&entries, &state.store.age_display()))
}

pub(crate) async fn flagged_page(State(state): State<AppState>) -> Html<String> {
    let cache = state.store.load();
    Html(html::flagged_page(&expiration::flagged_customers(&cache)))
}

/// Live view straight from the registry, bypassing the cache
pub(crate) async fn registry_page(
    State(state): State<AppState>,
    Query(params): Query<RegistryQuery>,
) -> Result<Html<String>, ApiFailure> {
    let now = Local::now().naive_local();
    let filter = DateFilter::parse(
        params.data_cadastro.as_deref(),
        params.data_modificacao.as_deref(),
        now.date(),
    )?;

    let records = state
        .client
        .fetch_filtered(filter.registered_since, filter.modified_since)
        .await;
    let entries = expiration::registry_listing(records.iter(), now);
    Ok(Html(html::registry_page(&entries, &filter)))
}

// ===== JSON =====

pub(crate) async fn flagged_customers(State(state): State<AppState>) -> Json<Vec<CustomerRecord>> {
    let cache = state.store.load();
    Json(expiration::flagged_customers(&cache))
}

pub(crate) async fn expiring_customers(State(state): State<AppState>) -> Json<Vec<ExpirationEntry>> {
    let outcome = sync::check_for_updates(&state.client, &state.store).await;
    Json(expiration::compute_report(&outcome.cache))
}

pub(crate) async fn set_flag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiFailure> {
    let mut cache = state.store.load();
    flags::set_flag(&mut cache, &state.store, &id)?;
    Ok(ActionResponse::ok("Flag added to customer."))
}

pub(crate) async fn clear_flag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiFailure> {
    let mut cache = state.store.load();
    flags::clear_flag(&mut cache, &state.store, &id)?;
    Ok(ActionResponse::ok("Flag removed from customer."))
}

pub(crate) async fn mark_modified(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<TouchRequest>>,
) -> Result<Json<ActionResponse>, ApiFailure> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let mut cache = state.store.load();
    flags::mark_modified(&mut cache, &state.store, &state.client, &id, request.update_remote).await?;
    Ok(ActionResponse::ok("Customer updated."))
}

pub(crate) async fn check_updates(State(state): State<AppState>) -> Json<SyncCheckResponse> {
    let outcome = sync::check_for_updates(&state.client, &state.store).await;
    let message = if outcome.updated {
        info!(fetched = outcome.fetched, cached = outcome.cache.len(), "Cache updated on request");
        format!("Cache updated; {} customers cached.", outcome.cache.len())
    } else {
        "No updates found.".to_string()
    };
    Json(SyncCheckResponse {
        updated: outcome.updated,
        message,
    })
}
