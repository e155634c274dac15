#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use regcache_core::RegistryConfig;
use serde_json::{json, Value};

pub const ACCESS_TOKEN: &str = "test-access";
pub const SECRET_TOKEN: &str = "test-secret";

/// In-process stand-in for the customer registry
#[derive(Default)]
pub struct FakeRegistry {
    pub customers: Mutex<Vec<Value>>,
    /// Overrides `paging.total`; defaults to the number of customers
    pub total: Mutex<Option<u64>>,
    /// List requests at or past this offset answer 500
    pub fail_from_offset: Mutex<Option<u64>>,
    pub fail_updates: Mutex<bool>,
    /// `data_mod_cliente` returned by updates; echoes the request when unset
    pub update_reply_date: Mutex<Option<String>>,
    pub list_queries: Mutex<Vec<HashMap<String, String>>>,
    pub updates: Mutex<Vec<(String, Value)>>,
}

impl FakeRegistry {
    pub fn with_customers(customers: Vec<Value>) -> Arc<Self> {
        let registry = Arc::new(Self::default());
        *registry.customers.lock().unwrap() = customers;
        registry
    }

    pub fn offsets_requested(&self) -> Vec<u64> {
        self.list_queries
            .lock()
            .unwrap()
            .iter()
            .filter_map(|q| q.get("offset").and_then(|o| o.parse().ok()))
            .collect()
    }
}

pub fn customer(id: u64, name: &str, registered: &str) -> Value {
    json!({
        "id_cliente": id,
        "razao_cliente": name,
        "data_cad_cliente": registered,
        "data_mod_cliente": "0000-00-00 00:00:00",
        "email_cliente": format!("contato{}@example.com", id),
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("access-token").and_then(|v| v.to_str().ok()) == Some(ACCESS_TOKEN)
        && headers.get("secret-access-token").and_then(|v| v.to_str().ok()) == Some(SECRET_TOKEN)
}

async fn list_handler(
    State(registry): State<Arc<FakeRegistry>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "bad tokens").into_response();
    }
    registry.list_queries.lock().unwrap().push(params.clone());

    let customers = registry.customers.lock().unwrap().clone();
    let total = registry
        .total
        .lock()
        .unwrap()
        .unwrap_or(customers.len() as u64);

    if let Some(since) = params.get("data_cadastro") {
        let data: Vec<Value> = customers
            .into_iter()
            .filter(|c| c["data_cad_cliente"].as_str().unwrap_or("") >= since.as_str())
            .collect();
        return Json(json!({ "data": data, "paging": { "total": total } })).into_response();
    }

    let offset: u64 = params.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);
    let limit: u64 = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(250);

    if let Some(fail_at) = *registry.fail_from_offset.lock().unwrap() {
        if offset >= fail_at {
            return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
        }
    }

    let page: Vec<Value> = customers
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    Json(json!({ "data": page, "paging": { "total": total, "offset": offset, "limit": limit } }))
        .into_response()
}

async fn update_handler(
    State(registry): State<Arc<FakeRegistry>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "bad tokens").into_response();
    }
    if *registry.fail_updates.lock().unwrap() {
        return (StatusCode::BAD_GATEWAY, "upstream down").into_response();
    }
    registry.updates.lock().unwrap().push((id.clone(), body.clone()));

    let date = registry
        .update_reply_date
        .lock()
        .unwrap()
        .clone()
        .map(Value::String)
        .unwrap_or_else(|| body["data_mod_cliente"].clone());
    Json(json!({ "code": 200, "data": { "id_cliente": id, "data_mod_cliente": date } }))
        .into_response()
}

/// Serve the fake registry on an ephemeral port
pub async fn spawn_registry(registry: Arc<FakeRegistry>) -> SocketAddr {
    let app = Router::new()
        .route("/clientes/", get(list_handler))
        .route("/clientes/:id", put(update_handler))
        .with_state(registry);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve registry") });
    addr
}

pub fn registry_config(addr: SocketAddr) -> RegistryConfig {
    RegistryConfig::new(format!("http://{}/clientes/", addr), ACCESS_TOKEN, SECRET_TOKEN)
}
