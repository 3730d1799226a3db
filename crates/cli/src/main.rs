use clap::Parser;
use noetic_cli::commands::{Cli, Commands, TransportArg};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Fast-path commands resolve before any subsystem boots.
    match &cli.command {
        Commands::Version => {
            println!("noetic {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Completions { shell } => {
            noetic_cli::completions::generate(*shell);
            return Ok(());
        }
        _ => {}
    }

    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Commands::Serve { transport, addr } = cli.command {
        let config = match cli.config {
            Some(path) => noetic_common::config::NoeticConfig::load(&path)?,
            None => noetic_common::config::NoeticConfig::default(),
        };
        let service = std::sync::Arc::new(noetic_core::NoeticService::start(config).await?);
        return match transport {
            TransportArg::Stdio => noetic_mcp::serve(&service).await,
            TransportArg::Http => noetic_api::ApiServer::new(service).run(&addr).await,
        };
    }

    noetic_cli::oneshot::run(cli.config.as_deref(), cli.namespace.as_deref(), cli.command).await
}
