use noetic_api::ApiServer;
use noetic_common::config::NoeticConfig;
use noetic_core::NoeticService;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match config_path {
        Some(path) => NoeticConfig::load(&path)?,
        None => NoeticConfig::default(),
    };

    let addr = std::env::var("NOETIC_API_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());

    let service = match NoeticService::start(config).await {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!(error = %e, "failed to start noetic service");
            std::process::exit(1);
        }
    };

    ApiServer::new(service).run(&addr).await
}
