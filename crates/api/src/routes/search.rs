use crate::errors::ApiError;
use crate::server::{resolve_namespace, AppState};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use noetic_search::types::{SearchRequest, SearchResponse};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct SearchBody {
    #[serde(flatten)]
    pub request: SearchRequest,
    pub namespace: Option<String>,
}

#[derive(Deserialize)]
pub struct NamespaceQuery {
    pub namespace: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<NamespaceQuery>,
    headers: HeaderMap,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>, ApiError> {
    if body.request.query.trim().is_empty() {
        return Err(noetic_common::Error::InvalidInput("query must not be empty".to_string()).into());
    }
    let namespace = resolve_namespace(&state, body.namespace.as_deref(), query.namespace.as_deref(), &headers);
    let response = state.service.web_search.search(&body.request, &namespace).await?;
    Ok(Json(response))
}
