use noetic_common::config::NoeticConfig;
use noetic_core::NoeticService;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // stdio is the wire; every log line goes to stderr, never stdout.
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(EnvFilter::from_default_env()).init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match config_path {
        Some(path) => NoeticConfig::load(&path).unwrap_or_else(|e| {
            error!(error = %e, "failed to load config, falling back to defaults");
            NoeticConfig::default()
        }),
        None => NoeticConfig::default(),
    };

    let service = match NoeticService::start(config).await {
        Ok(service) => service,
        Err(e) => {
            error!(error = %e, "failed to start noetic service");
            std::process::exit(1);
        }
    };

    if let Err(e) = noetic_mcp::serve(&service).await {
        error!(error = %e, "stdio transport exited with an error");
        std::process::exit(1);
    }
}
