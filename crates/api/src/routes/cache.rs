use crate::errors::ApiError;
use crate::server::{resolve_namespace, AppState};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use noetic_indexing::EvictionReport;
use noetic_storage::VectorMatch;
use serde::{Deserialize, Serialize};

use super::search::NamespaceQuery;

#[derive(Deserialize)]
pub struct CacheQueryBody {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub threshold: f32,
    pub namespace: Option<String>,
}

fn default_top_k() -> usize {
    10
}

pub async fn query(
    State(state): State<AppState>,
    Query(query_params): Query<NamespaceQuery>,
    headers: HeaderMap,
    Json(body): Json<CacheQueryBody>,
) -> Result<Json<Vec<VectorMatch>>, ApiError> {
    let namespace = resolve_namespace(&state, body.namespace.as_deref(), query_params.namespace.as_deref(), &headers);
    let matches = state.service.cache.query(&body.query, body.top_k, body.threshold, &namespace).await?;
    Ok(Json(matches))
}

pub async fn evict(State(state): State<AppState>) -> Result<Json<EvictionReport>, ApiError> {
    let report = state.service.eviction.run_eviction().await?;
    Ok(Json(report))
}

#[derive(Serialize)]
pub struct FlushResponse {
    pub removed: usize,
}

pub async fn flush(State(state): State<AppState>) -> Result<Json<FlushResponse>, ApiError> {
    let removed = state.service.eviction.flush_all().await?;
    Ok(Json(FlushResponse { removed }))
}

#[derive(Serialize)]
pub struct PromoteResponse {
    pub promoted: usize,
}

pub async fn promote(State(state): State<AppState>) -> Result<Json<PromoteResponse>, ApiError> {
    let promoted = state.service.store.promote().await?;
    Ok(Json(PromoteResponse { promoted }))
}
