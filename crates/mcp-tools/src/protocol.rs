//! Newline-delimited JSON-RPC 2.0 envelope types for the stdio transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcResponse {
    #[must_use]
    pub fn ok(id: Value, result: Value) -> Self {
        Self { jsonrpc: "2.0", id, result: Some(result), error: None }
    }

    #[must_use]
    pub fn err(id: Value, error: &noetic_common::Error) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError { code: -32000 - i64::from(error.status_code()), message: error.to_string() }),
        }
    }

    #[must_use]
    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self { jsonrpc: "2.0", id, result: None, error: Some(RpcError { code: -32601, message: format!("unknown tool: {method}") }) }
    }
}
