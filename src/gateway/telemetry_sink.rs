//! Telemetry sink: response-status counters, request-duration histogram,
//! token-usage counters, and tool-call counters, classified per spec §4.4
//! ("Telemetry") without pulling in a metrics backend — the gateway logs
//! structured events via `log`, following the upstream toolkit's own choice
//! of `log` + `env_logger` for all observability.

use std::time::Duration;

use log::info;

use crate::gateway::openai_types::Usage;

/// The three tool-call namespaces telemetry distinguishes, derived from the
/// synthetic tool name a middleware assigns (spec §4.5/§4.6 naming rules:
/// MCP tools are registered as `mcp_<name>`, A2A skills as `a2a_<skill>`;
/// anything else is a plain upstream LLM response with no tool call).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCallKind {
    Mcp,
    A2a,
    LlmResponse,
}

/// Classify a tool/function name into its telemetry namespace.
pub fn classify_tool_call(name: &str) -> ToolCallKind {
    if name.starts_with("mcp_") {
        ToolCallKind::Mcp
    } else if name.starts_with("a2a_") {
        ToolCallKind::A2a
    } else {
        ToolCallKind::LlmResponse
    }
}

/// Emits structured log lines for gateway telemetry events. Failures here
/// must never fail the request they're observing (spec §4.4 "never-fatal").
#[derive(Debug, Clone, Default)]
pub struct TelemetrySink;

impl TelemetrySink {
    pub fn new() -> Self {
        Self
    }

    pub fn record_response(&self, provider: &str, model: &str, status: u16, duration: Duration) {
        info!(
            "response provider={} model={} status={} duration_ms={}",
            provider,
            model,
            status,
            duration.as_millis()
        );
    }

    pub fn record_usage(&self, provider: &str, model: &str, usage: &Usage) {
        info!(
            "usage provider={} model={} prompt_tokens={} completion_tokens={} total_tokens={}",
            provider, model, usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    pub fn record_tool_call(&self, provider: &str, model: &str, tool_name: &str) {
        let kind = classify_tool_call(tool_name);
        info!(
            "tool_call provider={} model={} tool_type={:?} tool_name={}",
            provider, model, kind, tool_name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mcp_prefixed_tool_names_classify_as_mcp() {
        assert_eq!(classify_tool_call("mcp_search_docs"), ToolCallKind::Mcp);
    }

    #[test]
    fn a2a_prefixed_tool_names_classify_as_a2a() {
        assert_eq!(classify_tool_call("a2a_summarize"), ToolCallKind::A2a);
    }

    #[test]
    fn unprefixed_tool_names_classify_as_llm_response() {
        assert_eq!(
            classify_tool_call("get_weather"),
            ToolCallKind::LlmResponse
        );
    }

    #[test]
    fn record_calls_do_not_panic() {
        let sink = TelemetrySink::new();
        sink.record_response("openai", "gpt-4o", 200, Duration::from_millis(120));
        sink.record_usage(
            "openai",
            "gpt-4o",
            &Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
        );
        sink.record_tool_call("openai", "gpt-4o", "mcp_search_docs");
    }
}
