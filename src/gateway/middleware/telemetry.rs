//! Telemetry middleware (C8): timestamps entry, and on exit parses token
//! usage from unary or streamed-and-reassembled bodies and records tool-call
//! counters — a failure here must never fail the request (spec §4.4).

use crate::gateway::middleware::RequestContext;
use crate::gateway::openai_types::Usage;
use crate::gateway::telemetry_sink::TelemetrySink;

pub fn on_entry(ctx: &RequestContext<'_>) {
    log::debug!(
        "request entering middleware chain provider={} at={:?}",
        ctx.provider.def.id,
        ctx.entered_at
    );
}

/// Parse usage and tool calls out of a captured unary response body and
/// record them. Never propagates an error — malformed/partial bodies from
/// unusual providers are logged and skipped, not surfaced to the client.
pub fn on_exit(
    ctx: &RequestContext<'_>,
    sink: &TelemetrySink,
    status: u16,
    body: &serde_json::Value,
) {
    record(ctx.provider.def.id, ctx.entered_at.elapsed(), sink, status, body);
}

/// Equivalent of [`on_exit`] for a streaming chat completion, where no
/// [`RequestContext`] survives past the point the SSE bytes have already
/// reached the client — the caller supplies the provider id and elapsed
/// time directly, and `body` is the last `data:` payload the stream saw
/// that carried usage (or the last parseable payload at all, or `null`
/// if none parsed).
pub fn on_exit_streaming(
    provider_id: &str,
    elapsed: std::time::Duration,
    sink: &TelemetrySink,
    status: u16,
    body: &serde_json::Value,
) {
    record(provider_id, elapsed, sink, status, body);
}

fn record(
    provider_id: &str,
    elapsed: std::time::Duration,
    sink: &TelemetrySink,
    status: u16,
    body: &serde_json::Value,
) {
    let model = body
        .get("model")
        .and_then(|m| m.as_str())
        .unwrap_or("unknown");

    sink.record_response(provider_id, model, status, elapsed);

    if let Some(usage) = body.get("usage") {
        match serde_json::from_value::<Usage>(usage.clone()) {
            Ok(usage) => sink.record_usage(provider_id, model, &usage),
            Err(e) => log::warn!("telemetry: could not parse usage field: {}", e),
        }
    }

    let tool_calls = body
        .get("choices")
        .and_then(|c| c.as_array())
        .into_iter()
        .flatten()
        .filter_map(|choice| choice.get("message").or_else(|| choice.get("delta")))
        .filter_map(|m| m.get("tool_calls"))
        .filter_map(|tc| tc.as_array())
        .flatten();

    for call in tool_calls {
        if let Some(name) = call
            .get("function")
            .and_then(|f| f.get("name"))
            .and_then(|n| n.as_str())
        {
            sink.record_tool_call(provider_id, model, name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::catalog;
    use crate::gateway::config::GatewayConfig;
    use crate::gateway::registry::Provider;
    use serde_json::json;

    fn test_provider() -> Provider {
        Provider {
            def: catalog::lookup("openai").unwrap(),
            base_url: "https://api.openai.com/v1".into(),
            token: Some("sk-test".into()),
            client: reqwest::Client::new(),
        }
    }

    #[test]
    fn on_exit_extracts_usage_and_tool_calls_without_panicking() {
        let config = GatewayConfig {
            application_name: "test".into(),
            environment: "test".into(),
            enable_telemetry: true,
            enable_auth: false,
            auth_token: None,
            allowed_models: vec![],
            server_host: "0.0.0.0".into(),
            server_port: 8080,
            server_read_timeout: std::time::Duration::from_secs(60),
            server_write_timeout: std::time::Duration::from_secs(60),
            server_idle_timeout: std::time::Duration::from_secs(120),
            server_tls_cert_path: None,
            server_tls_key_path: None,
            client_timeout: std::time::Duration::from_secs(300),
            client_max_idle_conns: 100,
            client_max_idle_conns_per_host: 10,
            client_idle_conn_timeout: std::time::Duration::from_secs(90),
            provider_urls: Default::default(),
            provider_keys: Default::default(),
            mcp_enable: false,
            mcp_servers: vec![],
            a2a_enable: false,
            a2a_expose: false,
            a2a_agents: vec![],
            a2a_queue_capacity: 256,
            a2a_max_chat_completion_iterations: 5,
            a2a_cleanup_interval: std::time::Duration::from_secs(300),
            a2a_streaming_status_update_interval: std::time::Duration::from_millis(1000),
            oidc_issuer_url: None,
            oidc_client_id: None,
            oidc_client_secret: None,
        };
        let provider = test_provider();
        let ctx = RequestContext::new(&provider, &config);
        let sink = TelemetrySink::new();
        let body = json!({
            "model": "gpt-4o",
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5},
            "choices": [{"message": {"tool_calls": [{"function": {"name": "mcp_search"}}]}}]
        });
        on_exit(&ctx, &sink, 200, &body);
    }
}
