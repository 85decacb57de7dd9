//! A2A Client (C10): per-agent JSON-RPC client for talking to a remote
//! agent-to-agent endpoint — agent-card discovery, `message/send`,
//! `message/stream`, `tasks/get`, `tasks/cancel` (spec §4.7 "A2A client").

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::gateway::error::GatewayError;
use crate::gateway::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::gateway::middleware::A2A_INTERNAL_HEADER;
use crate::gateway::openai_types::ToolSpec;

/// A remote agent's self-description, served at `/.well-known/agent.json`
/// (spec §3 "Agent card").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCard {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSkill {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_schema: Option<Value>,
}

impl AgentCard {
    pub fn has_skill(&self, skill_id: &str) -> bool {
        self.skills.iter().any(|s| s.id == skill_id)
    }

    /// Expose each skill as an `a2a_<id>`-named tool spec for injection into
    /// a chat-completion request (spec §4.7).
    pub fn skills_as_tool_specs(&self) -> Vec<ToolSpec> {
        self.skills
            .iter()
            .map(|s| {
                ToolSpec::new(
                    format!("a2a_{}", s.id),
                    s.description.clone(),
                    s.input_schema
                        .clone()
                        .unwrap_or_else(|| json!({ "type": "object", "properties": {} })),
                )
            })
            .collect()
    }
}

/// Client bound to one remote agent's base URL.
pub struct A2aClient {
    base_url: String,
    http: reqwest::Client,
}

impl A2aClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    pub async fn agent_card(&self) -> Result<AgentCard, GatewayError> {
        let url = format!("{}/.well-known/agent.json", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))
    }

    /// Send a one-shot message to a named skill via `message/send` and
    /// return the task's final result payload.
    pub async fn send_skill(&self, skill: &str, arguments: Value) -> Result<Value, GatewayError> {
        let text = serde_json::to_string(&arguments).unwrap_or_default();
        let params = json!({
            "message": {
                "role": "user",
                "parts": [
                    { "kind": "text", "text": text },
                    { "kind": "data", "data": arguments.clone() },
                ],
                "messageId": uuid::Uuid::new_v4().to_string(),
            },
            "configuration": { "blocking": true },
            "metadata": { "skill": skill, "arguments": arguments },
        });
        self.rpc_call("message/send", params).await
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Value, GatewayError> {
        self.rpc_call("tasks/get", json!({ "id": task_id })).await
    }

    pub async fn cancel_task(&self, task_id: &str) -> Result<Value, GatewayError> {
        self.rpc_call("tasks/cancel", json!({ "id": task_id })).await
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, GatewayError> {
        let request = JsonRpcRequest::new(json!(uuid::Uuid::new_v4().to_string()), method, params);
        let response = self
            .http
            .post(format!("{}/a2a", self.base_url.trim_end_matches('/')))
            .header(A2A_INTERNAL_HEADER, "true")
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))?;

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(GatewayError::UpstreamUnreachable(format!(
                "A2A agent error {}: {}",
                error.code, error.message
            )));
        }
        body.result
            .ok_or_else(|| GatewayError::Internal("A2A response had neither result nor error".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_card_has_skill_checks_by_id() {
        let card = AgentCard {
            name: "translator".into(),
            description: String::new(),
            url: "https://agent.example.com".into(),
            skills: vec![AgentSkill {
                id: "translate".into(),
                name: "Translate".into(),
                description: "Translate text".into(),
                input_schema: None,
            }],
        };
        assert!(card.has_skill("translate"));
        assert!(!card.has_skill("summarize"));
    }

    #[test]
    fn skills_as_tool_specs_prefixes_with_a2a() {
        let card = AgentCard {
            name: "translator".into(),
            description: String::new(),
            url: "https://agent.example.com".into(),
            skills: vec![AgentSkill {
                id: "translate".into(),
                name: "Translate".into(),
                description: "Translate text".into(),
                input_schema: None,
            }],
        };
        let tools = card.skills_as_tool_specs();
        assert_eq!(tools[0].function.name, "a2a_translate");
    }
}
