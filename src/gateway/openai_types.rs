//! OpenAI-compatible wire types for `/v1/chat/completions` and `/v1/models`
//! (spec §3 "Data model"). Every optional field carries `#[serde(default)]`
//! so the gateway tolerates provider-specific extensions it doesn't
//! understand and passes unknown shapes through largely unscathed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single part of a `content` array — either a text span or an image URL.
/// Modeled untagged so both the legacy plain-string `content` and the
/// newer array-of-parts shape round-trip through the same type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text {
        #[serde(rename = "type")]
        kind: String,
        text: String,
    },
    ImageUrl {
        #[serde(rename = "type")]
        kind: String,
        image_url: Value,
    },
}

/// `content` can be a bare string or an ordered sequence of parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl Content {
    /// Flatten to a single string, concatenating text parts and describing
    /// non-text parts by type. Used by middlewares that only need a textual
    /// view of a message (MCP/A2A enrichment, telemetry).
    pub fn as_text(&self) -> String {
        match self {
            Content::Text(s) => s.clone(),
            Content::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text, .. } => Some(text.clone()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// A single message in a chat-completion request/response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A tool/function call attached to an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments string, per spec §3 "Tool call".
    pub arguments: String,
}

/// A partial tool-call fragment as it arrives in a streaming delta, keyed by
/// `index` so fragments across chunks can be merged (spec §3, §9
/// "Tool-call merging in streams").
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolCallFragment {
    pub index: usize,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub function: Option<FunctionCallFragment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FunctionCallFragment {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

/// Merge tool-call fragments arriving across streaming chunks into complete
/// tool calls, keyed by integer index; concatenate `arguments` strings, last
/// writer wins for `id`/`name` (spec §9).
pub fn merge_tool_call_fragments(fragments: &[ToolCallFragment]) -> Vec<ToolCall> {
    use std::collections::BTreeMap;

    struct Partial {
        id: Option<String>,
        kind: Option<String>,
        name: Option<String>,
        arguments: String,
    }

    let mut by_index: BTreeMap<usize, Partial> = BTreeMap::new();
    for frag in fragments {
        let entry = by_index.entry(frag.index).or_insert_with(|| Partial {
            id: None,
            kind: None,
            name: None,
            arguments: String::new(),
        });
        if let Some(id) = &frag.id {
            entry.id = Some(id.clone());
        }
        if let Some(kind) = &frag.kind {
            entry.kind = Some(kind.clone());
        }
        if let Some(function) = &frag.function {
            if let Some(name) = &function.name {
                entry.name = Some(name.clone());
            }
            if let Some(args) = &function.arguments {
                entry.arguments.push_str(args);
            }
        }
    }

    by_index
        .into_values()
        .map(|p| ToolCall {
            id: p.id.unwrap_or_default(),
            kind: p.kind.unwrap_or_else(|| "function".to_string()),
            function: FunctionCall {
                name: p.name.unwrap_or_default(),
                arguments: p.arguments,
            },
        })
        .collect()
}

/// A `type=function` tool specification exposed to the upstream model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parameters: Value,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionSpec {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// OpenAI-compatible chat-completion request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// `finish_reason` for a chat-completion choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<ChatMessage>,
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// OpenAI-compatible chat-completion response body (unary or streamed chunk).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A single entry of `GET /v1/models`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
    pub served_by: String,
}

/// `GET /v1/models` response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<Model>,
}
