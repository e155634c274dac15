//! API client for the remote customer registry.
//!
//! This module provides the `ApiClient` struct for reading customer pages,
//! the registry's total count, date-filtered listings, and for pushing
//! partial record updates.

use std::collections::BTreeMap;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::models::CustomerRecord;
use crate::utils::format::{REMOTE_DATETIME_FORMAT, REMOTE_DATE_FORMAT};

use super::ApiError;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Body shape of the registry's list endpoint
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    total: Option<Value>,
}

/// API client for the customer registry.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: RegistryConfig,
}

impl ApiClient {
    pub fn new(config: RegistryConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder().default_headers(Self::auth_headers(&config)?);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    fn auth_headers(config: &RegistryConfig) -> anyhow::Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "access-token",
            header::HeaderValue::from_str(&config.access_token)
                .context("Access token is not a valid header value")?,
        );
        headers.insert(
            "secret-access-token",
            header::HeaderValue::from_str(&config.secret_access_token)
                .context("Secret access token is not a valid header value")?,
        );
        headers.insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-cache"));
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Decode a successful response body, reporting which URL sent garbage
    async fn decode<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> ApiResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::MalformedBody(format!("{} from {}", e, url)))
    }

    async fn get_list(&self, query: &[(&str, String)]) -> ApiResult<ListResponse> {
        let url = &self.config.base_url;
        let response = self.client.get(url).query(query).send().await?;
        let response = Self::check_response(response).await?;
        Self::decode(response, url).await
    }

    /// Decode the `data` array of a list response, skipping entries that are
    /// not usable customer records.
    fn records_from(data: Option<Value>) -> ApiResult<Vec<CustomerRecord>> {
        let items = match data {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(ApiError::MalformedBody(format!(
                    "expected `data` to be an array, got {}",
                    other
                )))
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<CustomerRecord>(item) {
                Ok(record) => records.push(record),
                Err(e) => warn!(error = %e, "Skipping malformed customer record"),
            }
        }
        Ok(records)
    }

    // ===== Listing =====

    /// Fetch one page of customers. An empty page marks the end of the data.
    pub async fn fetch_page(&self, offset: u64, limit: u32) -> Result<Vec<CustomerRecord>> {
        let body = self
            .get_list(&[("offset", offset.to_string()), ("limit", limit.to_string())])
            .await
            .map_err(Error::RemoteUnavailable)?;
        let records = Self::records_from(body.data).map_err(Error::RemoteUnavailable)?;
        debug!(offset, limit, count = records.len(), "Fetched customer page");
        Ok(records)
    }

    /// Fetch every customer, page by page, keyed by id.
    ///
    /// Stops at the first empty page. A failed request ends the walk early and
    /// whatever was collected so far is returned.
    pub async fn fetch_all(&self) -> BTreeMap<String, CustomerRecord> {
        let page_size = self.config.page_size.max(1);
        let mut all = BTreeMap::new();
        let mut offset: u64 = 0;

        loop {
            match self.fetch_page(offset, page_size).await {
                Ok(page) if page.is_empty() => break,
                Ok(page) => {
                    for record in page {
                        all.insert(record.id.clone(), record);
                    }
                    offset += u64::from(page_size);
                }
                Err(e) => {
                    warn!(
                        offset,
                        collected = all.len(),
                        error = %e,
                        "Failed to fetch customer page, returning partial result"
                    );
                    break;
                }
            }
        }

        debug!(count = all.len(), "Fetched all customers");
        all
    }

    /// Total number of customers the registry reports
    pub async fn try_fetch_total_count(&self) -> Result<u64> {
        let body = self.get_list(&[]).await.map_err(Error::RemoteUnavailable)?;
        let total = body
            .paging
            .and_then(|p| p.total)
            .as_ref()
            .and_then(parse_count)
            .unwrap_or(0);
        Ok(total)
    }

    /// Total number of customers the registry reports, or 0 if it cannot be read
    pub async fn fetch_total_count(&self) -> u64 {
        match self.try_fetch_total_count().await {
            Ok(total) => total,
            Err(e) => {
                warn!(error = %e, "Failed to read registry total");
                0
            }
        }
    }

    /// Customers registered since `registered_since`, optionally restricted to
    /// those modified since `modified_since`.
    pub async fn try_fetch_filtered(
        &self,
        registered_since: NaiveDate,
        modified_since: Option<NaiveDateTime>,
    ) -> Result<Vec<CustomerRecord>> {
        let mut query = vec![(
            "data_cadastro",
            registered_since.format(REMOTE_DATE_FORMAT).to_string(),
        )];
        if let Some(modified) = modified_since {
            query.push((
                "data_modificacao",
                modified.format(REMOTE_DATETIME_FORMAT).to_string(),
            ));
        }

        let body = self.get_list(&query).await.map_err(Error::RemoteUnavailable)?;
        match body.data {
            Some(Value::Array(_)) => Self::records_from(body.data).map_err(Error::RemoteUnavailable),
            _ => Err(Error::RemoteUnavailable(ApiError::MalformedBody(
                "response has no `data` array".to_string(),
            ))),
        }
    }

    /// Date-filtered listing; failures are logged and yield an empty list
    pub async fn fetch_filtered(
        &self,
        registered_since: NaiveDate,
        modified_since: Option<NaiveDateTime>,
    ) -> Vec<CustomerRecord> {
        match self.try_fetch_filtered(registered_since, modified_since).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Failed to fetch filtered customers");
                Vec::new()
            }
        }
    }

    // ===== Updates =====

    /// Send a partial update for one customer and return the fields the
    /// registry reports back.
    pub async fn update_record_remote(
        &self,
        id: &str,
        fields: &Map<String, Value>,
    ) -> ApiResult<Map<String, Value>> {
        let url = self.config.record_url(id);
        let response = self.client.put(&url).json(fields).send().await?;
        let response = Self::check_response(response).await?;
        let body: Value = Self::decode(response, &url).await?;

        debug!(id = %id, "Updated customer in registry");
        Ok(updated_fields(body))
    }
}

/// The registry wraps single records in `data` on some endpoints and not on others
fn updated_fields(body: Value) -> Map<String, Value> {
    match body {
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                obj.insert("data".to_string(), other);
                obj
            }
            None => obj,
        },
        _ => Map::new(),
    }
}

/// Counts may come back as numbers or numeric strings
fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
