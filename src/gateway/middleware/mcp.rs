//! MCP middleware (C9, middleware half): injects MCP-advertised tool specs
//! into outgoing chat-completion requests, and on the way out executes any
//! `mcp_`-prefixed tool calls the upstream model asked for, attaching their
//! results to the response for the caller's next turn (spec §4.5).
//!
//! Tool execution here is a single pass over the final (already-dispatched)
//! response body — it does not re-enter the dispatcher to continue the
//! conversation. The bounded, re-dispatching tool-call loop lives in the
//! A2A Agent Runtime ([`crate::gateway::a2a_server::worker`]), which is the
//! one component in this spec that owns a multi-turn conversation; the
//! stateless proxy surface stays single-pass per spec §9's streaming note.

use once_cell::sync::Lazy;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::gateway::error::GatewayError;
use crate::gateway::mcp_client::McpClient;
use crate::gateway::middleware::RequestContext;
use crate::gateway::openai_types::ChatCompletionRequest;

static CLIENTS: Lazy<DashMap<String, Arc<McpClient>>> = Lazy::new(DashMap::new);

/// Tool name (already `mcp_`-prefixed, as advertised) → owning server
/// endpoint, populated at cache-population time in [`inject_tools`] (spec
/// §4.5 "Populate capability cache and tool→server-url routing map").
static ROUTES: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

fn client_for(endpoint: &str) -> Arc<McpClient> {
    CLIENTS
        .entry(endpoint.to_string())
        .or_insert_with(|| Arc::new(McpClient::new(endpoint, reqwest::Client::new())))
        .clone()
}

/// Fetch tool specs from every configured MCP server, append them to the
/// outgoing request's `tools` array, and (re)populate the tool-name routing
/// table. A tool name already claimed by an earlier server wins; the
/// collision is logged (spec §4.5).
pub async fn inject_tools(
    ctx: &RequestContext<'_>,
    request: &mut ChatCompletionRequest,
) -> Result<(), GatewayError> {
    let mut all_tools = request.tools.take().unwrap_or_default();
    for endpoint in &ctx.config.mcp_servers {
        let client = client_for(endpoint);
        match client.tools().await {
            Ok(tools) => {
                for tool in &tools {
                    route_tool(&tool.function.name, endpoint);
                }
                all_tools.extend(tools);
            }
            Err(e) => log::warn!("MCP handshake with {} failed: {}", endpoint, e),
        }
    }
    if !all_tools.is_empty() {
        request.tools = Some(all_tools);
    }
    Ok(())
}

fn route_tool(tool_name: &str, endpoint: &str) {
    match ROUTES.entry(tool_name.to_string()) {
        dashmap::mapref::entry::Entry::Vacant(slot) => {
            slot.insert(endpoint.to_string());
        }
        dashmap::mapref::entry::Entry::Occupied(slot) => {
            if slot.get() != endpoint {
                log::warn!(
                    "MCP tool name collision: '{}' already routed to {}, ignoring duplicate advertised by {}",
                    tool_name,
                    slot.get(),
                    endpoint
                );
            }
        }
    }
}

/// Execute any `mcp_`-prefixed tool calls found in the final response body
/// and append a `role: "tool"` chat message per call to the response's
/// message stream (spec §4.5 step 5), never failing the response — an
/// individual tool failure becomes an error-bearing tool message instead.
pub async fn handle_tool_calls(
    _ctx: &RequestContext<'_>,
    body: &mut Value,
) -> Result<(), GatewayError> {
    let calls = collect_mcp_tool_calls(body);
    if calls.is_empty() {
        return Ok(());
    }

    let mut messages = Vec::new();
    for (id, name, arguments) in calls {
        let content = match execute_routed(&name, arguments).await {
            Ok(value) => extract_text(&value),
            Err(e) => format!("Error: {}", e),
        };
        messages.push(serde_json::json!({
            "role": "tool",
            "tool_call_id": id,
            "name": name,
            "content": content,
        }));
    }

    if let Value::Object(map) = body {
        let existing = map
            .get("messages")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let merged: Vec<Value> = existing.into_iter().chain(messages).collect();
        map.insert("messages".to_string(), Value::Array(merged));
    }
    Ok(())
}

/// Look up the tool's owning server in the routing table and invoke it
/// there. A missing route surfaces the spec's literal error text (spec
/// §4.5 step 5: `"Error: Tool '<name>' not found"`).
async fn execute_routed(name: &str, arguments: Value) -> Result<Value, GatewayError> {
    let bare_name = name.strip_prefix("mcp_").unwrap_or(name);
    let Some(endpoint) = ROUTES.get(name).map(|e| e.clone()) else {
        return Err(GatewayError::Internal(format!("Tool '{}' not found", name)));
    };
    client_for(&endpoint).call_tool(bare_name, arguments).await
}

/// Pull a human-readable text payload out of an MCP `tools/call` result,
/// falling back to the raw JSON when the result has no recognizable text
/// content (spec §4.5 step 5: "the extracted text of the MCP result").
fn extract_text(value: &Value) -> String {
    if let Some(text) = value.as_str() {
        return text.to_string();
    }
    if let Some(parts) = value.get("content").and_then(|c| c.as_array()) {
        let joined: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");
        if !joined.is_empty() {
            return joined;
        }
    }
    value.to_string()
}

fn collect_mcp_tool_calls(body: &Value) -> Vec<(String, String, Value)> {
    body.get("choices")
        .and_then(|c| c.as_array())
        .into_iter()
        .flatten()
        .filter_map(|choice| choice.get("message"))
        .filter_map(|m| m.get("tool_calls"))
        .filter_map(|tc| tc.as_array())
        .flatten()
        .filter_map(|call| {
            let id = call.get("id")?.as_str()?.to_string();
            let function = call.get("function")?;
            let name = function.get("name")?.as_str()?.to_string();
            if !name.starts_with("mcp_") {
                return None;
            }
            let arguments_str = function.get("arguments")?.as_str().unwrap_or("{}");
            let arguments: Value = serde_json::from_str(arguments_str).unwrap_or(Value::Null);
            Some((id, name, arguments))
        })
        .collect()
}
