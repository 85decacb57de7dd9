//! A2A middleware (C11): exposes configured remote agents' skills as
//! `a2a_<skill>`-named tools on outgoing requests, and on the way out
//! dispatches any such tool calls to the owning agent over JSON-RPC
//! (spec §4.7 "A2A as tools").

use once_cell::sync::Lazy;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::gateway::a2a_client::A2aClient;
use crate::gateway::error::GatewayError;
use crate::gateway::middleware::RequestContext;
use crate::gateway::openai_types::ChatCompletionRequest;

static CLIENTS: Lazy<DashMap<String, Arc<A2aClient>>> = Lazy::new(DashMap::new);

/// Tool name (`a2a_<skill-id>`) → owning agent base URL, populated at
/// cache-population time in [`inject_tools`] (spec §4.5/§4.7's routing-map
/// requirement applies identically to the A2A-as-tools surface).
static ROUTES: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

fn client_for(base_url: &str) -> Arc<A2aClient> {
    CLIENTS
        .entry(base_url.to_string())
        .or_insert_with(|| Arc::new(A2aClient::new(base_url, reqwest::Client::new())))
        .clone()
}

/// Fetch each configured agent's card, expose its skills as
/// `a2a_<skill-id>` tools on the outgoing request, and (re)populate the
/// tool-name routing table. A skill name already claimed by an earlier
/// agent wins; the collision is logged.
pub async fn inject_tools(
    ctx: &RequestContext<'_>,
    request: &mut ChatCompletionRequest,
) -> Result<(), GatewayError> {
    let mut all_tools = request.tools.take().unwrap_or_default();
    for agent_url in &ctx.config.a2a_agents {
        let client = client_for(agent_url);
        match client.agent_card().await {
            Ok(card) => {
                let tools = card.skills_as_tool_specs();
                for tool in &tools {
                    route_tool(&tool.function.name, agent_url);
                }
                all_tools.extend(tools);
            }
            Err(e) => log::warn!("A2A agent card fetch from {} failed: {}", agent_url, e),
        }
    }
    if !all_tools.is_empty() {
        request.tools = Some(all_tools);
    }
    Ok(())
}

fn route_tool(tool_name: &str, agent_url: &str) {
    match ROUTES.entry(tool_name.to_string()) {
        dashmap::mapref::entry::Entry::Vacant(slot) => {
            slot.insert(agent_url.to_string());
        }
        dashmap::mapref::entry::Entry::Occupied(slot) => {
            if slot.get() != agent_url {
                log::warn!(
                    "A2A skill name collision: '{}' already routed to {}, ignoring duplicate advertised by {}",
                    tool_name,
                    slot.get(),
                    agent_url
                );
            }
        }
    }
}

/// Execute any `a2a_`-prefixed tool calls found in the final response body
/// by sending `message/send` to the owning agent, appending a `role:
/// "tool"` chat message per call to the response's message stream alongside
/// any MCP results. Never fails the response.
pub async fn handle_tool_calls(
    _ctx: &RequestContext<'_>,
    body: &mut Value,
) -> Result<(), GatewayError> {
    let calls = collect_a2a_tool_calls(body);
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

/// Look up the skill's owning agent in the routing table and send it
/// there. A missing route surfaces the spec's literal error text (spec
/// §4.5 step 5: `"Error: Tool '<name>' not found"`).
async fn execute_routed(name: &str, arguments: Value) -> Result<Value, GatewayError> {
    let skill = name.strip_prefix("a2a_").unwrap_or(name);
    let Some(agent_url) = ROUTES.get(name).map(|e| e.clone()) else {
        return Err(GatewayError::Internal(format!("Tool '{}' not found", name)));
    };
    client_for(&agent_url).send_skill(skill, arguments).await
}

/// Pull a human-readable text payload out of an A2A task result, falling
/// back to the raw JSON when the result has no recognizable text content.
fn extract_text(value: &Value) -> String {
    if let Some(text) = value.as_str() {
        return text.to_string();
    }
    if let Some(result) = value.get("result").and_then(|r| r.as_str()) {
        return result.to_string();
    }
    value.to_string()
}

fn collect_a2a_tool_calls(body: &Value) -> Vec<(String, String, Value)> {
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
            if !name.starts_with("a2a_") {
                return None;
            }
            let arguments_str = function.get("arguments")?.as_str().unwrap_or("{}");
            let arguments: Value = serde_json::from_str(arguments_str).unwrap_or(Value::Null);
            Some((id, name, arguments))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collect_a2a_tool_calls_ignores_mcp_names() {
        let body = json!({
            "choices": [{
                "message": {
                    "tool_calls": [
                        {"id": "1", "function": {"name": "a2a_summarize", "arguments": "{}"}},
                        {"id": "2", "function": {"name": "mcp_search", "arguments": "{}"}}
                    ]
                }
            }]
        });
        let calls = collect_a2a_tool_calls(&body);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "a2a_summarize");
    }
}
