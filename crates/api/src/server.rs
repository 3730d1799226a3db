//! `/api/v1` router: one axum `Router` over a shared `NoeticService`.

use crate::types::HealthResponse;
use axum::http::HeaderMap;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use noetic_core::NoeticService;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NoeticService>,
}

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    #[must_use]
    pub fn new(service: Arc<NoeticService>) -> Self {
        Self { state: AppState { service } }
    }

    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/api/v1/search", post(crate::routes::search::search))
            .route("/api/v1/crawl", post(crate::routes::crawl::crawl))
            .route("/api/v1/chunk", post(crate::routes::chunk::chunk))
            .route("/api/v1/cache", post(crate::routes::cache::query))
            .route("/api/v1/cache/evict", post(crate::routes::cache::evict))
            .route("/api/v1/cache", delete(crate::routes::cache::flush))
            .route("/api/v1/cache/promote", post(crate::routes::cache::promote))
            .route("/api/v1/sitemap", post(crate::routes::sitemap::discover))
            .route("/api/v1/map", post(crate::routes::map::map))
            .route("/api/v1/batch-crawl", post(crate::routes::batch_crawl::submit))
            .route("/api/v1/jobs", post(crate::routes::jobs::submit))
            .route("/api/v1/jobs", get(crate::routes::jobs::list))
            .route("/api/v1/jobs/:id", get(crate::routes::jobs::status))
            .route("/api/v1/jobs/:id", delete(crate::routes::jobs::cancel))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr, "noetic-api listening");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_string(), timestamp: Utc::now() })
}

/// Namespace priority: request body field, then the `namespace` query
/// parameter, then the `X-Noetic-Project` header, then the configured
/// default — matched by `NamespaceResolver`'s own (explicit, header)
/// chain by folding body+query into one `explicit` candidate.
pub fn resolve_namespace(state: &AppState, body_namespace: Option<&str>, query_namespace: Option<&str>, headers: &HeaderMap) -> String {
    let explicit = body_namespace.filter(|s| !s.is_empty()).or(query_namespace.filter(|s| !s.is_empty()));
    let header = headers.get("X-Noetic-Project").and_then(|v| v.to_str().ok());
    state.service.resolve_namespace(explicit, header)
}
