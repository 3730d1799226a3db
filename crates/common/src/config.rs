//! Process configuration, loaded from a TOML file with `serde(default)`
//! fallbacks for every tunable — the same shape as the teacher's
//! `SystemConfig::load`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoeticConfig {
    pub store: StoreConfig,
    pub embed: EmbedConfig,
    pub fetch: FetchConfig,
    pub search: SearchConfig,
    pub crawl: CrawlConfig,
    pub eviction: EvictionConfig,
    pub namespace: NamespaceConfig,
}

impl Default for NoeticConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            embed: EmbedConfig::default(),
            fetch: FetchConfig::default(),
            search: SearchConfig::default(),
            crawl: CrawlConfig::default(),
            eviction: EvictionConfig::default(),
            namespace: NamespaceConfig::default(),
        }
    }
}

impl NoeticConfig {
    /// Load from a TOML file; falls back to defaults for any missing key.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    #[must_use]
    pub fn data_root() -> std::path::PathBuf {
        dirs_home().join(".websearch")
    }
}

fn dirs_home() -> std::path::PathBuf {
    std::env::var_os("HOME")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from("."))
}

/// Two-tier vs single-tier selection and backend choice for `VectorStore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mode: StoreMode,
    pub vector_dim: usize,
    pub agent_id: Option<String>,
    /// Connection URL for non-local backends (e.g. a Qdrant gRPC endpoint).
    pub remote_url: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Local,
            mode: StoreMode::Server,
            vector_dim: default_vector_dim(),
            agent_id: None,
            remote_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Local,
    Pinecone,
    Qdrant,
    Weaviate,
    Milvus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreMode {
    Server,
    Agent,
}

fn default_vector_dim() -> usize {
    384
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub provider: EmbedProvider,
    pub model_name: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            provider: EmbedProvider::Onnx,
            model_name: "bge-small-en-v1.5".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedProvider {
    Onnx,
    OpenAi,
    Cohere,
    Voyage,
    Bedrock,
    Azure,
    Vertex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub default_timeout_secs: u64,
    pub max_body_bytes: usize,
    pub browser_pool_size: usize,
    pub chromium_path: Option<String>,
    pub proxy_url: Option<String>,
    pub fallback_chain: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 30,
            max_body_bytes: 10 * 1024 * 1024,
            browser_pool_size: 2,
            chromium_path: None,
            proxy_url: None,
            fallback_chain: vec!["static".to_string(), "dynamic".to_string(), "api".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub cache_threshold: f32,
    pub stream_rotate_every: u32,
    pub retry_on_empty: bool,
    pub scraping_endpoint: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_threshold: 0.92,
            stream_rotate_every: 20,
            retry_on_empty: true,
            scraping_endpoint: "https://html.duckduckgo.com/html/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub max_concurrency: usize,
    pub rate_limit_ms: u64,
    pub task_timeout_secs: u64,
    pub auto_chunk: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            rate_limit_ms: 500,
            task_timeout_secs: 60,
            auto_chunk: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvictionConfig {
    pub search_result_ttl_secs: i64,
    pub query_cache_ttl_secs: i64,
    pub crawl_chunk_ttl_secs: i64,
    pub max_entries: usize,
    pub sweep_interval_secs: u64,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            search_result_ttl_secs: 24 * 3600,
            query_cache_ttl_secs: 6 * 3600,
            crawl_chunk_ttl_secs: 7 * 24 * 3600,
            max_entries: 200_000,
            sweep_interval_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    pub default_namespace: String,
    pub max_len: usize,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            default_namespace: "default".to_string(),
            max_len: 64,
        }
    }
}
