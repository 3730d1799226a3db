use crate::errors::ApiError;
use crate::server::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct SitemapBody {
    pub domain: String,
    #[serde(default = "default_max_urls")]
    pub max_urls: usize,
    pub path_filter: Option<String>,
}

fn default_max_urls() -> usize {
    500
}

#[derive(Serialize)]
pub struct SitemapResponse {
    pub urls: Vec<String>,
}

pub async fn discover(State(state): State<AppState>, Json(body): Json<SitemapBody>) -> Result<Json<SitemapResponse>, ApiError> {
    if body.domain.trim().is_empty() {
        return Err(noetic_common::Error::InvalidInput("domain must not be empty".to_string()).into());
    }
    let urls = state.service.sitemap.discover(&body.domain, body.max_urls, body.path_filter.as_deref()).await?;
    Ok(Json(SitemapResponse { urls }))
}
