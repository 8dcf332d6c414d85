//! # Client Module
//!
//! HTTP client for the hosted Pinecone service.
//!
//! [`PineconeClient`] is the authenticated entry point. It resolves an index name
//! through the control plane and hands back an [`Index`] bound to that index's
//! data-plane host, which carries the record operations.
//!
//! Construction does no I/O. A bad or empty credential is reported by the
//! service on the first request, as [`ProbeError::Unauthorized`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use pinecone_probe::{Config, PineconeClient, probe_record};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PineconeClient::new(&Config::new("pcsk_..."))?;
//! let index = client.index("nerion-face-index").await?;
//! let response = index.upsert(&[probe_record()]).await?;
//! println!("upserted {}", response.upserted_count);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::{ProbeError, ProbeResult};
use crate::VectorRecord;

/// REST API version sent with every request
pub const API_VERSION: &str = "2024-07";

const API_KEY_HEADER: &str = "Api-Key";
const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";

/// Authenticated handle to the remote service
#[derive(Clone)]
pub struct PineconeClient {
    http: Client,
    api_key: String,
    controller_host: String,
}

impl std::fmt::Debug for PineconeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeClient")
            .field("controller_host", &self.controller_host)
            .finish()
    }
}

/// Control-plane description of an index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: usize,
    #[serde(default)]
    pub metric: String,
    /// Data-plane host, usually without a scheme
    pub host: String,
}

/// Response to an upsert call
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResponse {
    #[serde(default)]
    pub upserted_count: u32,
}

/// A record as returned by a fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedVector {
    pub id: String,
    #[serde(default)]
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub vectors: HashMap<String, FetchedVector>,
    #[serde(default)]
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSummary {
    #[serde(default)]
    pub vector_count: u64,
}

/// Record counts reported by the data plane
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    #[serde(default)]
    pub dimension: usize,
    #[serde(default)]
    pub total_vector_count: u64,
    #[serde(default)]
    pub index_fullness: f64,
    #[serde(default)]
    pub namespaces: HashMap<String, NamespaceSummary>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
}

impl PineconeClient {
    /// Build a client from configuration. Performs no network I/O.
    pub fn new(config: &Config) -> ProbeResult<Self> {
        let http = Client::builder().build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            controller_host: normalize_host(&config.controller_host),
        })
    }

    pub fn controller_host(&self) -> &str {
        &self.controller_host
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(API_KEY_HEADER, &self.api_key)
            .header(API_VERSION_HEADER, API_VERSION)
    }

    /// Look up an index by name on the control plane
    pub async fn describe_index(&self, name: &str) -> ProbeResult<IndexDescription> {
        let url = format!("{}/indexes/{}", self.controller_host, name);
        debug!(index = name, url = %url, "Describing index");

        let response = self.authorize(self.http.get(&url)).send().await?;
        let response = check_status(response, Some(name)).await?;

        let description: IndexDescription = response.json().await?;
        Ok(description)
    }

    /// Resolve an index name to a handle bound to its data-plane host
    pub async fn index(&self, name: &str) -> ProbeResult<Index> {
        let description = self.describe_index(name).await?;
        let base_url = normalize_host(&description.host);

        info!(
            index = %description.name,
            host = %base_url,
            dimension = description.dimension,
            "Resolved index"
        );

        Ok(Index {
            client: self.clone(),
            description,
            base_url,
        })
    }
}

/// Handle scoped to one named index
#[derive(Debug, Clone)]
pub struct Index {
    client: PineconeClient,
    description: IndexDescription,
    base_url: String,
}

impl Index {
    pub fn name(&self) -> &str {
        &self.description.name
    }

    /// Dimension the service reported for this index
    pub fn dimension(&self) -> usize {
        self.description.dimension
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }

    /// Insert or replace records by id.
    ///
    /// Records are sent as-is; the service is the one that checks dimensions.
    pub async fn upsert(&self, records: &[VectorRecord]) -> ProbeResult<UpsertResponse> {
        let url = format!("{}/vectors/upsert", self.base_url);
        debug!(index = %self.name(), count = records.len(), "Upserting records");

        let request = self.client.http.post(&url).json(&UpsertRequest { vectors: records });
        let response = self.client.authorize(request).send().await?;
        let response = check_status(response, None).await?;

        let upserted: UpsertResponse = response.json().await?;
        info!(
            index = %self.name(),
            upserted_count = upserted.upserted_count,
            "Upsert accepted"
        );
        Ok(upserted)
    }

    /// Fetch records by id. Unknown ids are absent from the result.
    pub async fn fetch(&self, ids: &[&str]) -> ProbeResult<FetchResponse> {
        let url = format!("{}/vectors/fetch", self.base_url);
        let query: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", *id)).collect();

        let request = self.client.http.get(&url).query(&query);
        let response = self.client.authorize(request).send().await?;
        let response = check_status(response, None).await?;

        let fetched: FetchResponse = response.json().await?;
        debug!(index = %self.name(), requested = ids.len(), found = fetched.vectors.len(), "Fetched records");
        Ok(fetched)
    }

    pub async fn describe_index_stats(&self) -> ProbeResult<IndexStats> {
        let url = format!("{}/describe_index_stats", self.base_url);

        let request = self.client.http.post(&url).json(&serde_json::json!({}));
        let response = self.client.authorize(request).send().await?;
        let response = check_status(response, None).await?;

        let stats: IndexStats = response.json().await?;
        Ok(stats)
    }
}

async fn check_status(response: Response, index: Option<&str>) -> ProbeResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ProbeError::from_status(status.as_u16(), message, index))
}

/// Trim trailing slashes and default to `https://` when no scheme is given
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
