//! Tool dispatch table: MCP tool name to core-service call, per the
//! stdio transport's name -> core call mapping.

use noetic_common::types::FetchMode;
use noetic_common::{Error, Result};
use noetic_core::NoeticService;
use serde_json::{json, Value};

pub const TOOL_NAMES: &[&str] = &[
    "web_search",
    "crawl_page",
    "chunk_content",
    "cache_query",
    "cache_evict",
    "cache_flush",
    "batch_crawl",
    "discover_sitemap",
    "map_site",
    "job_status",
    "job_cancel",
    "cache_promote",
];

fn str_field<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

fn usize_field(params: &Value, key: &str, default: usize) -> usize {
    params.get(key).and_then(Value::as_u64).map_or(default, |v| v as usize)
}

fn namespace_field(service: &NoeticService, params: &Value) -> String {
    service.resolve_namespace(str_field(params, "namespace"), None)
}

fn fetch_mode_field(params: &Value) -> FetchMode {
    match str_field(params, "fetchMode") {
        None | Some("auto") => FetchMode::Auto,
        Some(name) => FetchMode::Named(name.to_string()),
    }
}

#[tracing::instrument(skip(service, params), fields(tool))]
pub async fn dispatch(service: &NoeticService, tool: &str, params: Value) -> Result<Value> {
    match tool {
        "web_search" => {
            let request: noetic_search::types::SearchRequest = serde_json::from_value(params.clone()).map_err(|e| Error::InvalidInput(e.to_string()))?;
            if request.query.trim().is_empty() {
                return Err(Error::InvalidInput("query must not be empty".to_string()));
            }
            let namespace = namespace_field(service, &params);
            let response = service.web_search.search(&request, &namespace).await?;
            serde_json::to_value(response).map_err(Into::into)
        }
        "crawl_page" => {
            let url = str_field(&params, "url").ok_or_else(|| Error::InvalidInput("url is required".to_string()))?;
            let result = service.crawl_page(url, fetch_mode_field(&params)).await?;
            serde_json::to_value(SerializableFetchResult::from(result)).map_err(Into::into)
        }
        "chunk_content" => {
            let content = str_field(&params, "content").ok_or_else(|| Error::InvalidInput("content is required".to_string()))?;
            let strategy = str_field(&params, "strategy").unwrap_or("sentence");
            let max_chunk_size = usize_field(&params, "maxChunkSize", 1000);
            let overlap = usize_field(&params, "overlap", 100);
            let source_url = str_field(&params, "sourceUrl");
            let namespace = namespace_field(service, &params);
            let outcome = service.chunk.chunk(content, strategy, max_chunk_size, overlap, source_url, &namespace).await?;
            serde_json::to_value(outcome).map_err(Into::into)
        }
        "cache_query" => {
            let query = str_field(&params, "query").ok_or_else(|| Error::InvalidInput("query is required".to_string()))?;
            let top_k = usize_field(&params, "topK", 10);
            let threshold = params.get("threshold").and_then(Value::as_f64).unwrap_or(0.0) as f32;
            let namespace = namespace_field(service, &params);
            let matches = service.cache.query(query, top_k, threshold, &namespace).await?;
            serde_json::to_value(matches).map_err(Into::into)
        }
        "cache_evict" => {
            let report = service.eviction.run_eviction().await?;
            serde_json::to_value(report).map_err(Into::into)
        }
        "cache_flush" => {
            let removed = service.eviction.flush_all().await?;
            Ok(json!({ "removed": removed }))
        }
        "batch_crawl" => {
            let request = build_batch_crawl_request(service, &params)?;
            let report = service.batch_crawl.batch_crawl(request).await?;
            serde_json::to_value(report).map_err(Into::into)
        }
        "discover_sitemap" => {
            let domain = str_field(&params, "domain").ok_or_else(|| Error::InvalidInput("domain is required".to_string()))?;
            let max_urls = usize_field(&params, "maxUrls", 1000);
            let path_filter = str_field(&params, "pathFilter");
            let urls = service.sitemap.discover(domain, max_urls, path_filter).await?;
            Ok(json!({ "discoveredUrls": urls }))
        }
        "map_site" => {
            let start_url = str_field(&params, "startUrl").ok_or_else(|| Error::InvalidInput("startUrl is required".to_string()))?;
            let max_depth = usize_field(&params, "maxDepth", 2) as u32;
            let max_urls = usize_field(&params, "maxUrls", 1000);
            let path_filter = str_field(&params, "pathFilter");
            let urls = service.map.map(start_url, max_depth, max_urls, path_filter).await?;
            Ok(json!({ "urls": urls }))
        }
        "job_status" => {
            let job_id = str_field(&params, "jobId").ok_or_else(|| Error::InvalidInput("jobId is required".to_string()))?;
            let status = service.jobs.status(job_id).await?;
            serde_json::to_value(status).map_err(Into::into)
        }
        "job_cancel" => {
            let job_id = str_field(&params, "jobId").ok_or_else(|| Error::InvalidInput("jobId is required".to_string()))?;
            service.jobs.cancel(job_id).await?;
            Ok(json!({ "cancelled": true }))
        }
        "cache_promote" => {
            let promoted = service.store.promote().await?;
            Ok(json!({ "promoted": promoted }))
        }
        other => Err(Error::NotFound(format!("unknown tool: {other}"))),
    }
}

fn build_batch_crawl_request(service: &NoeticService, params: &Value) -> Result<noetic_crawl::BatchCrawlRequest> {
    let urls = params
        .get("urls")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    Ok(noetic_crawl::BatchCrawlRequest {
        urls,
        domain: str_field(params, "domain").map(str::to_string),
        fetch_mode: fetch_mode_field(params),
        chunk_strategy: str_field(params, "chunkStrategy").unwrap_or("sentence").to_string(),
        max_concurrency: usize_field(params, "maxConcurrency", service.config.crawl.max_concurrency),
        rate_limit_ms: params.get("rateLimitMs").and_then(Value::as_u64).unwrap_or(service.config.crawl.rate_limit_ms),
        path_filter: str_field(params, "pathFilter").map(str::to_string),
        max_urls: usize_field(params, "maxUrls", 1000),
        auto_chunk: params.get("autoChunk").and_then(Value::as_bool).unwrap_or(service.config.crawl.auto_chunk),
        namespace: namespace_field(service, params),
    })
}

/// `FetchResult` carries a `Duration`, which does not serialize; this is
/// the wire-shape projection returned to MCP/HTTP callers.
#[derive(serde::Serialize)]
struct SerializableFetchResult {
    final_url: String,
    title: String,
    content: String,
    links: Vec<String>,
    images: Vec<String>,
    word_count: usize,
    status: u16,
    fetcher_used: String,
    elapsed_ms: u128,
}

impl From<noetic_fetch::FetchResult> for SerializableFetchResult {
    fn from(r: noetic_fetch::FetchResult) -> Self {
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
