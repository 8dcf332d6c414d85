//! In-memory stand-in for the Pinecone control and data planes.
//!
//! Serves `GET /indexes/:name` like the control plane and reports each index's
//! host as `{base}/data/:name`, under which the data-plane routes live. It
//! enforces the credential, index existence and dimension the way the hosted
//! service does, and stores records by id (insert or replace).

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pinecone_probe::Config;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub const TEST_API_KEY: &str = "pcsk_test_key";

struct IndexState {
    dimension: usize,
    records: BTreeMap<String, Value>,
}

struct Emulator {
    api_key: String,
    base_url: String,
    indexes: HashMap<String, IndexState>,
}

type AppState = Arc<RwLock<Emulator>>;

enum EmulatorError {
    Unauthenticated,
    IndexNotFound(String),
    InvalidArgument(String),
}

impl IntoResponse for EmulatorError {
    fn into_response(self) -> Response {
        match self {
            EmulatorError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": { "code": "UNAUTHENTICATED", "message": "Invalid API Key" },
                    "status": 401
                })),
            )
                .into_response(),
            EmulatorError::IndexNotFound(name) => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": { "code": "NOT_FOUND", "message": format!("Resource {} not found", name) },
                    "status": 404
                })),
            )
                .into_response(),
            EmulatorError::InvalidArgument(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "code": 3, "message": message, "details": [] })),
            )
                .into_response(),
        }
    }
}

fn authorize(state: &Emulator, headers: &HeaderMap) -> Result<(), EmulatorError> {
    let presented = headers.get("Api-Key").and_then(|v| v.to_str().ok()).unwrap_or_default();
    if presented.is_empty() || presented != state.api_key {
        return Err(EmulatorError::Unauthenticated);
    }
    Ok(())
}

async fn describe_index(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, EmulatorError> {
    let emulator = state.read().unwrap();
    authorize(&emulator, &headers)?;

    let index = emulator
        .indexes
        .get(&name)
        .ok_or_else(|| EmulatorError::IndexNotFound(name.clone()))?;

    Ok(Json(json!({
        "name": name,
        "dimension": index.dimension,
        "metric": "cosine",
        "host": format!("{}/data/{}", emulator.base_url, name),
        "spec": { "serverless": { "cloud": "aws", "region": "us-east-1" } },
        "status": { "ready": true, "state": "Ready" }
    })))
}

async fn upsert(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, EmulatorError> {
    let mut emulator = state.write().unwrap();
    authorize(&emulator, &headers)?;

    let index = emulator
        .indexes
        .get_mut(&name)
        .ok_or_else(|| EmulatorError::IndexNotFound(name.clone()))?;

    let vectors = body["vectors"]
        .as_array()
        .ok_or_else(|| EmulatorError::InvalidArgument("vectors must be an array".to_string()))?;

    // Validate the whole batch before writing any of it
    for vector in vectors {
        let values = vector["values"]
            .as_array()
            .ok_or_else(|| EmulatorError::InvalidArgument("values must be an array".to_string()))?;
        if values.len() != index.dimension {
            return Err(EmulatorError::InvalidArgument(format!(
                "Vector dimension {} does not match the dimension of the index {}",
                values.len(),
                index.dimension
            )));
        }
        if vector["id"].as_str().map_or(true, str::is_empty) {
            return Err(EmulatorError::InvalidArgument("id must be a non-empty string".to_string()));
        }
        if !(vector["metadata"].is_null() || vector["metadata"].is_object()) {
            return Err(EmulatorError::InvalidArgument("metadata must be an object".to_string()));
        }
    }

    for vector in vectors {
        let id = vector["id"].as_str().unwrap_or_default().to_string();
        index.records.insert(id, vector.clone());
    }

    Ok(Json(json!({ "upsertedCount": vectors.len() })))
}

async fn fetch(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, EmulatorError> {
    let emulator = state.read().unwrap();
    authorize(&emulator, &headers)?;

    let index = emulator
        .indexes
        .get(&name)
        .ok_or_else(|| EmulatorError::IndexNotFound(name.clone()))?;

    let vectors: serde_json::Map<String, Value> = params
        .iter()
        .filter(|(key, _)| key == "ids")
        .filter_map(|(_, id)| index.records.get(id).map(|record| (id.clone(), record.clone())))
        .collect();

    Ok(Json(json!({ "vectors": vectors, "namespace": "" })))
}

async fn describe_index_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, EmulatorError> {
    let emulator = state.read().unwrap();
    authorize(&emulator, &headers)?;

    let index = emulator
        .indexes
        .get(&name)
        .ok_or_else(|| EmulatorError::IndexNotFound(name.clone()))?;

    let count = index.records.len();
    Ok(Json(json!({
        "namespaces": { "": { "vectorCount": count } },
        "dimension": index.dimension,
        "indexFullness": 0.0,
        "totalVectorCount": count
    })))
}

fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/indexes/:name", get(describe_index))
        .route("/data/:name/vectors/upsert", post(upsert))
        .route("/data/:name/vectors/fetch", get(fetch))
        .route("/data/:name/describe_index_stats", post(describe_index_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A running emulator bound to an ephemeral local port
pub struct MockPinecone {
    pub addr: SocketAddr,
    state: AppState,
}

impl MockPinecone {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(RwLock::new(Emulator {
            api_key: TEST_API_KEY.to_string(),
            base_url: format!("http://{}", addr),
            indexes: HashMap::new(),
        }));

        let app = create_app(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn create_index(&self, name: &str, dimension: usize) {
        self.state.write().unwrap().indexes.insert(
            name.to_string(),
            IndexState {
                dimension,
                records: BTreeMap::new(),
            },
        );
    }

    /// Client configuration pointing at this emulator
    pub fn config(&self, api_key: &str) -> Config {
        Config::new(api_key).with_controller_host(self.url())
    }

    pub fn record_count(&self, index: &str) -> usize {
        self.state
            .read()
            .unwrap()
            .indexes
            .get(index)
            .map_or(0, |state| state.records.len())
    }

    pub fn stored(&self, index: &str, id: &str) -> Option<Value> {
        self.state.read().unwrap().indexes.get(index)?.records.get(id).cloned()
    }
}
