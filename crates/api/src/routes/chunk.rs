use crate::errors::ApiError;
use crate::server::{resolve_namespace, AppState};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use noetic_indexing::ChunkOutcome;
use serde::Deserialize;

use super::search::NamespaceQuery;

#[derive(Deserialize)]
pub struct ChunkBody {
    pub content: String,
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    pub source_url: Option<String>,
    pub namespace: Option<String>,
}

fn default_strategy() -> String {
    "sentence".to_string()
}

fn default_max_chunk_size() -> usize {
    1000
}

fn default_overlap() -> usize {
    100
}

pub async fn chunk(
    State(state): State<AppState>,
    Query(query): Query<NamespaceQuery>,
    headers: HeaderMap,
    Json(body): Json<ChunkBody>,
) -> Result<Json<ChunkOutcome>, ApiError> {
    let namespace = resolve_namespace(&state, body.namespace.as_deref(), query.namespace.as_deref(), &headers);
    let outcome = state
        .service
        .chunk
        .chunk(&body.content, &body.strategy, body.max_chunk_size, body.overlap, body.source_url.as_deref(), &namespace)
        .await?;
    Ok(Json(outcome))
}
