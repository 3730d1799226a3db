use crate::errors::ApiError;
use crate::server::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct MapBody {
    pub start_url: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    #[serde(default = "default_max_urls")]
    pub max_urls: usize,
    pub path_filter: Option<String>,
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_urls() -> usize {
    500
}

#[derive(Serialize)]
pub struct MapResponse {
    pub urls: Vec<String>,
}

pub async fn map(State(state): State<AppState>, Json(body): Json<MapBody>) -> Result<Json<MapResponse>, ApiError> {
    if body.start_url.trim().is_empty() {
        return Err(noetic_common::Error::InvalidInput("startUrl must not be empty".to_string()).into());
    }
    let urls = state.service.map.map(&body.start_url, body.max_depth, body.max_urls, body.path_filter.as_deref()).await?;
    Ok(Json(MapResponse { urls }))
}
