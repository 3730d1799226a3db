//! Storage-level value types: `VectorEntry`, `VectorMatch`, and the
//! metadata filter re-exported from `noetic-common`.

use chrono::{DateTime, Utc};
use noetic_common::types::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

/// The unit stored in the index.
///
/// `(namespace, id)` is unique; upsert is delete-then-insert under one
/// commit. Legacy entries serialized before namespaces existed deserialize
/// with `namespace = "default"` via the `serde(default)` below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorEntry {
    pub id: String,
    pub vector: Vec<f32>,
    pub content: String,
    pub entry_type: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl VectorEntry {
    /// Epoch seconds used by eviction range queries.
    #[must_use]
    pub fn created_at_epoch(&self) -> i64 {
        self.created_at.timestamp()
    }
}

/// A scored hit returned from `VectorStore::search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub content: String,
    pub metadata: HashMap<String, String>,
}
