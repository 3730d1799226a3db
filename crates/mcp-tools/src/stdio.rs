//! Newline-delimited JSON-RPC loop over stdin/stdout. All logging for
//! this transport must land on stderr; nothing but RPC envelopes ever
//! touches stdout.

use crate::protocol::{RpcRequest, RpcResponse};
use crate::tools::{dispatch, TOOL_NAMES};
use noetic_core::NoeticService;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

pub async fn serve(service: &NoeticService) -> anyhow::Result<()> {
    if let Some(root) = std::env::var("NOETIC_WORKSPACE_ROOT").ok().filter(|s| !s.is_empty()) {
        noetic_common::namespace::set_workspace_root(root);
    }

    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    info!("stdio transport ready, {} tools registered", TOOL_NAMES.len());

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(service, &line).await;
        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        stdout.write_all(&payload).await?;
        stdout.flush().await?;
    }
    Ok(())
}

async fn handle_line(service: &NoeticService, line: &str) -> RpcResponse {
    let request: RpcRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "malformed JSON-RPC line");
            return RpcResponse { jsonrpc: "2.0", id: Value::Null, result: None, error: Some(crate::protocol::RpcError { code: -32700, message: e.to_string() }) };
        }
    };
    let id = request.id.unwrap_or(Value::Null);

    if request.method == "tools/list" {
        return RpcResponse::ok(id, json!({ "tools": TOOL_NAMES }));
    }

    if !TOOL_NAMES.contains(&request.method.as_str()) {
        return RpcResponse::method_not_found(id, &request.method);
    }

    match dispatch(service, &request.method, request.params).await {
        Ok(result) => RpcResponse::ok(id, result),
        Err(e) => RpcResponse::err(id, &e),
    }
}
