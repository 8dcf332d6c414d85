//! # pinecone-probe
//!
//! Writes one fixed test record into a hosted Pinecone index. A clean run
//! means the credential works, the index exists and accepts 512-dimensional
//! vectors.
//!
//! The flow is linear: load [`Config`], build a [`PineconeClient`], resolve the
//! index by name, upsert [`probe_record`]. Any failure ends the run with the
//! error as reported; nothing is retried.

pub mod client;
pub mod config;
pub mod errors;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use client::{FetchResponse, FetchedVector, Index, IndexDescription, IndexStats, PineconeClient, UpsertResponse};
pub use config::Config;
pub use errors::{ProbeError, ProbeResult};

/// Index the probe writes to
pub const INDEX_NAME: &str = "nerion-face-index";

pub const RECORD_ID: &str = "user_test";

/// Dimension of the probe vector; must match the target index
pub const PROBE_DIMENSION: usize = 512;

pub const PROBE_VALUE: f32 = 0.1;

/// Line printed to stdout after a successful upsert
pub const SUCCESS_MESSAGE: &str = "✅ Test vector upserted into Pinecone";

/// A record submitted to the service: id, dense values and string metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            values,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

/// The fixed record the probe writes
pub fn probe_record() -> VectorRecord {
    VectorRecord::new(RECORD_ID, vec![PROBE_VALUE; PROBE_DIMENSION]).with_metadata("test", "true")
}

/// Upsert [`probe_record`] into [`INDEX_NAME`].
///
/// Errors from index resolution or the write are returned untouched.
pub async fn run(config: &Config) -> ProbeResult<UpsertResponse> {
    let client = PineconeClient::new(config)?;
    let index = client.index(INDEX_NAME).await?;

    let record = probe_record();
    let response = index.upsert(std::slice::from_ref(&record)).await?;

    info!(
        index = INDEX_NAME,
        id = %record.id,
        upserted_count = response.upserted_count,
        "Probe record written"
    );
    Ok(response)
}
