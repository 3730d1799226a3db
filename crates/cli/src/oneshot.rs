//! Boots a `NoeticService` for a single command invocation and tears it
//! down afterward. Exit code is non-zero (via the `?` bubbling to `main`)
//! on any failure, matching the one-shot contract.

use crate::commands::Commands;
use noetic_common::config::NoeticConfig;
use noetic_core::NoeticService;
use std::path::Path;

pub async fn run(config_path: Option<&Path>, namespace: Option<&str>, command: Commands) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => NoeticConfig::load(path)?,
        None => NoeticConfig::default(),
    };

    let service = NoeticService::start(config).await?;
    let namespace = service.resolve_namespace(namespace, None);

    let result = crate::commands::dispatch(&service, &namespace, command).await;
    service.shutdown().await?;
    result
}
