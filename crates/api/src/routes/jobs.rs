use crate::errors::ApiError;
use crate::server::{resolve_namespace, AppState};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use noetic_common::types::FetchMode;
use noetic_crawl::JobStatus;
use serde::Serialize;

use super::batch_crawl::BatchCrawlBody;
use super::search::NamespaceQuery;

#[derive(Serialize)]
pub struct SubmitResponse {
    pub id: String,
}

pub async fn submit(
    State(state): State<AppState>,
    Query(query): Query<NamespaceQuery>,
    headers: HeaderMap,
    Json(body): Json<BatchCrawlBody>,
) -> Result<Json<SubmitResponse>, ApiError> {
    if body.urls.is_empty() && body.domain.is_none() {
        return Err(noetic_common::Error::InvalidInput("either urls or domain must be provided".to_string()).into());
    }
    let namespace = resolve_namespace(&state, body.namespace.as_deref(), query.namespace.as_deref(), &headers);
    let fetch_mode = match body.fetch_mode.as_deref() {
        None | Some("auto") => FetchMode::Auto,
        Some(name) => FetchMode::Named(name.to_string()),
    };
    let config = &state.service.config.crawl;
    let request = noetic_crawl::BatchCrawlRequest {
        urls: body.urls,
        domain: body.domain,
        fetch_mode,
        chunk_strategy: body.chunk_strategy.unwrap_or_else(|| "sentence".to_string()),
        max_concurrency: body.max_concurrency.unwrap_or(config.max_concurrency),
        rate_limit_ms: body.rate_limit_ms.unwrap_or(config.rate_limit_ms),
        path_filter: body.path_filter,
        max_urls: body.max_urls.unwrap_or(500),
        auto_chunk: body.auto_chunk.unwrap_or(config.auto_chunk),
        namespace,
    };
    let id = state.service.jobs.submit(request).await;
    Ok(Json(SubmitResponse { id }))
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<JobStatus>> {
    Json(state.service.jobs.list().await)
}

pub async fn status(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<JobStatus>, ApiError> {
    let status = state.service.jobs.status(&id).await?;
    Ok(Json(status))
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

pub async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<CancelResponse>, ApiError> {
    state.service.jobs.cancel(&id).await?;
    Ok(Json(CancelResponse { cancelled: true }))
}
