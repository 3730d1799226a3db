use crate::errors::ApiError;
use axum::extract::State;
use axum::Json;
use noetic_common::types::FetchMode;
use noetic_fetch::FetchResult;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Deserialize)]
pub struct CrawlBody {
    pub url: String,
    pub fetch_mode: Option<String>,
}

#[derive(Serialize)]
pub struct CrawlResponse {
    pub final_url: String,
    pub title: String,
    pub content: String,
    pub links: Vec<String>,
    pub images: Vec<String>,
    pub word_count: usize,
    pub status: u16,
    pub fetcher_used: String,
    pub elapsed_ms: u128,
}

impl From<FetchResult> for CrawlResponse {
    fn from(r: FetchResult) -> Self {
        Self {
            final_url: r.final_url,
            title: r.title,
            content: r.content,
            links: r.links,
            images: r.images,
            word_count: r.word_count,
            status: r.status,
            fetcher_used: r.fetcher_used,
            elapsed_ms: r.elapsed.as_millis(),
        }
    }
}

pub async fn crawl(State(state): State<AppState>, Json(body): Json<CrawlBody>) -> Result<Json<CrawlResponse>, ApiError> {
    if body.url.trim().is_empty() {
        return Err(noetic_common::Error::InvalidInput("url must not be empty".to_string()).into());
    }
    let mode = match body.fetch_mode.as_deref() {
        None | Some("auto") => FetchMode::Auto,
        Some(name) => FetchMode::Named(name.to_string()),
    };
    let result = state.service.crawl_page(&body.url, mode).await?;
    Ok(Json(result.into()))
}
