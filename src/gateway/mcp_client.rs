//! MCP Client (C9, client half): JSON-RPC-over-HTTP client for a single
//! configured MCP server — handshake, tool-list cache with TTL, and
//! `tools/call` (spec §4.5 "MCP handshake & caching").

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::gateway::error::GatewayError;
use crate::gateway::jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::gateway::openai_types::ToolSpec;

const TOOL_LIST_TTL: Duration = Duration::from_secs(300);

struct CachedTools {
    tools: Vec<ToolSpec>,
    fetched_at: Instant,
}

/// A JSON-RPC client bound to one MCP server's HTTP endpoint. Caches the
/// `tools/list` result for [`TOOL_LIST_TTL`] so every chat-completion
/// request doesn't re-handshake.
pub struct McpClient {
    endpoint: String,
    http: reqwest::Client,
    cache: Arc<RwLock<Option<CachedTools>>>,
}

impl McpClient {
    pub fn new(endpoint: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Perform the `initialize` → `tools/list` handshake, or return the
    /// cached tool list if it hasn't expired.
    pub async fn tools(&self) -> Result<Vec<ToolSpec>, GatewayError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < TOOL_LIST_TTL {
                    return Ok(cached.tools.clone());
                }
            }
        }

        self.call(
            "initialize",
            json!({ "protocolVersion": "2024-11-05", "capabilities": {} }),
        )
        .await?;

        let list_result = self.call("tools/list", json!({})).await?;
        let tools = parse_tool_list(&list_result)?;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedTools {
            tools: tools.clone(),
            fetched_at: Instant::now(),
        });
        Ok(tools)
    }

    /// Invoke `tools/call` for a named tool with JSON arguments, returning
    /// the tool's result content as a JSON value.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, GatewayError> {
        self.call("tools/call", json!({ "name": name, "arguments": arguments }))
            .await
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, GatewayError> {
        let request = JsonRpcRequest::new(json!(uuid::Uuid::new_v4().to_string()), method, params);
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))?;

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(mcp_error_to_gateway_error(error));
        }
        body.result
            .ok_or_else(|| GatewayError::Internal("MCP response had neither result nor error".into()))
    }
}

fn mcp_error_to_gateway_error(error: JsonRpcError) -> GatewayError {
    GatewayError::UpstreamUnreachable(format!("MCP server error {}: {}", error.code, error.message))
}

fn parse_tool_list(value: &Value) -> Result<Vec<ToolSpec>, GatewayError> {
    let tools = value
        .get("tools")
        .and_then(|t| t.as_array())
        .ok_or_else(|| GatewayError::Internal("tools/list response missing `tools` array".into()))?;

    tools
        .iter()
        .map(|t| {
            let name = t
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| GatewayError::Internal("MCP tool missing `name`".into()))?;
            let description = t
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            let parameters = t
                .get("inputSchema")
                .cloned()
                .unwrap_or_else(|| json!({ "type": "object", "properties": {} }));
            Ok(ToolSpec::new(format!("mcp_{}", name), description, parameters))
        })
        .collect()
}
