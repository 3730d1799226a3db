use crate::errors::ApiError;
use crate::server::{resolve_namespace, AppState};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use noetic_common::types::FetchMode;
use noetic_crawl::BatchCrawlReport;
use serde::Deserialize;

use super::search::NamespaceQuery;

#[derive(Deserialize)]
pub struct BatchCrawlBody {
    #[serde(default)]
    pub urls: Vec<String>,
    pub domain: Option<String>,
    pub fetch_mode: Option<String>,
    pub chunk_strategy: Option<String>,
    pub max_concurrency: Option<usize>,
    pub rate_limit_ms: Option<u64>,
    pub path_filter: Option<String>,
    pub max_urls: Option<usize>,
    pub auto_chunk: Option<bool>,
    pub namespace: Option<String>,
}

pub async fn submit(
    State(state): State<AppState>,
    Query(query): Query<NamespaceQuery>,
    headers: HeaderMap,
    Json(body): Json<BatchCrawlBody>,
) -> Result<Json<BatchCrawlReport>, ApiError> {
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
    let report = state.service.batch_crawl.batch_crawl(request).await?;
    Ok(Json(report))
}
