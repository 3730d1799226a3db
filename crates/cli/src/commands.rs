//! Command definitions and dispatch against an already-started `NoeticService`.
//!
//! `Version` and `Completions` are fast-path: `main` must resolve them before
//! a `NoeticService` is ever constructed, since building one loads the
//! embedder model and may spin up a browser pool.

use clap::{Parser, Subcommand, ValueEnum};
use noetic_common::types::FetchMode;
use noetic_core::NoeticService;
use noetic_search::types::SearchRequest;

#[derive(Parser)]
#[command(name = "noetic", version, about = "Local knowledge-cache service: search, crawl, chunk, and serve")]
pub struct Cli {
    /// Path to a TOML config file; defaults are used when absent.
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Namespace to scope storage operations to.
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the CLI version and exit without starting any subsystem.
    Version,
    /// Emit shell completion script to standard output.
    Completions { shell: clap_complete::Shell },
    /// Run a search query against the cache, falling back to the live provider on a miss.
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        max_results: usize,
    },
    /// Fetch a single URL through the resolver chain.
    Crawl {
        url: String,
        #[arg(long)]
        fetch_mode: Option<String>,
    },
    /// Chunk raw text content and embed it into the store.
    Chunk {
        content: String,
        #[arg(long, default_value = "sentence")]
        strategy: String,
    },
    /// Query the vector store directly by semantic similarity.
    CacheQuery {
        query: String,
        #[arg(long, default_value_t = 10)]
        top_k: usize,
    },
    /// Run a TTL/cap eviction sweep now.
    CacheEvict,
    /// Remove every entry in the store.
    CacheFlush,
    /// Copy the agent tier into the shared tier (agent mode only).
    CachePromote,
    /// Discover and ingest a list of URLs under bounded concurrency.
    BatchCrawl {
        #[arg(required = true)]
        urls: Vec<String>,
        #[arg(long, default_value_t = 4)]
        max_concurrency: usize,
        #[arg(long, default_value_t = 500)]
        rate_limit_ms: u64,
    },
    /// Discover URLs from a domain's sitemap(s).
    Sitemap {
        domain: String,
        #[arg(long, default_value_t = 500)]
        max_urls: usize,
    },
    /// Breadth-first same-host link crawl starting from a URL.
    Map {
        start_url: String,
        #[arg(long, default_value_t = 2)]
        max_depth: u32,
    },
    /// Look up the status of a previously submitted batch-crawl job.
    JobStatus { id: String },
    /// Request cooperative cancellation of a running job.
    JobCancel { id: String },
    /// List every known job.
    JobList,
    /// Start a long-running transport: stdio JSON-RPC or HTTP.
    Serve {
        #[arg(value_enum, default_value_t = TransportArg::Stdio)]
        transport: TransportArg,
        #[arg(long, default_value = "0.0.0.0:8787")]
        addr: String,
    },
    /// Drop into an interactive REPL for search queries.
    Interactive,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum TransportArg {
    #[default]
    Stdio,
    Http,
}

/// Run every command except `Version`/`Completions`/`Serve`, which `main`
/// handles itself (the first two never touch a service; `Serve` hands off
/// to a long-running loop instead of returning).
pub async fn dispatch(service: &NoeticService, namespace: &str, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Search { query, max_results } => {
            let mut request = SearchRequest::new(query);
            request.max_results = max_results;
            let response = service.web_search.search(&request, namespace).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Crawl { url, fetch_mode } => {
            let mode = match fetch_mode.as_deref() {
                None | Some("auto") => FetchMode::Auto,
                Some(name) => FetchMode::Named(name.to_string()),
            };
            let result = service.crawl_page(&url, mode).await?;
            println!("{} [{}] {} bytes via {}", result.status, result.final_url, result.content.len(), result.fetcher_used);
        }
        Commands::Chunk { content, strategy } => {
            let outcome = service.chunk.chunk(&content, &strategy, 1000, 100, None, namespace).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::CacheQuery { query, top_k } => {
            let matches = service.cache.query(&query, top_k, 0.0, namespace).await?;
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        Commands::CacheEvict => {
            let report = service.eviction.run_eviction().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::CacheFlush => {
            let removed = service.eviction.flush_all().await?;
            println!("removed {removed} entries");
        }
        Commands::CachePromote => {
            let promoted = service.store.promote().await?;
            println!("promoted {promoted} entries");
        }
        Commands::BatchCrawl { urls, max_concurrency, rate_limit_ms } => {
            let request = noetic_crawl::BatchCrawlRequest {
                urls,
                domain: None,
                fetch_mode: FetchMode::Auto,
                chunk_strategy: "sentence".to_string(),
                max_concurrency,
                rate_limit_ms,
                path_filter: None,
                max_urls: 500,
                auto_chunk: service.config.crawl.auto_chunk,
                namespace: namespace.to_string(),
            };
            let report = service.batch_crawl.batch_crawl(request).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Sitemap { domain, max_urls } => {
            let urls = service.sitemap.discover(&domain, max_urls, None).await?;
            for url in urls {
                println!("{url}");
            }
        }
        Commands::Map { start_url, max_depth } => {
            let urls = service.map.map(&start_url, max_depth, 500, None).await?;
            for url in urls {
                println!("{url}");
            }
        }
        Commands::JobStatus { id } => {
            let status = service.jobs.status(&id).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::JobCancel { id } => {
            service.jobs.cancel(&id).await?;
            println!("cancelled {id}");
        }
        Commands::JobList => {
            let jobs = service.jobs.list().await;
            println!("{}", serde_json::to_string_pretty(&jobs)?);
        }
        Commands::Interactive => {
            crate::interactive::run(service, namespace).await?;
        }
        Commands::Version | Commands::Completions { .. } | Commands::Serve { .. } => unreachable!("handled before dispatch"),
    }
    Ok(())
}
