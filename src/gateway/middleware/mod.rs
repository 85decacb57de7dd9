//! Middleware chain (C7): an ordered filter chain wrapping the dispatcher,
//! matching spec §4.4's declared order telemetry → auth → MCP → A2A →
//! dispatcher, with entry code running in declared order and exit code
//! running in reverse. Self-originated A2A requests carry `X-A2A-Internal`
//! and bypass the whole chain (spec §4.7 "Loop prevention").

pub mod a2a;
pub mod auth;
pub mod mcp;
pub mod telemetry;

use std::time::Instant;

use axum::http::HeaderMap;

use crate::gateway::config::GatewayConfig;
use crate::gateway::error::GatewayError;
use crate::gateway::openai_types::ChatCompletionRequest;
use crate::gateway::registry::Provider;
use crate::gateway::telemetry_sink::TelemetrySink;

/// Header a self-originated A2A-internal request carries so the chain
/// short-circuits straight to the dispatcher (spec §4.7).
pub const A2A_INTERNAL_HEADER: &str = "x-a2a-internal";

pub fn is_a2a_internal(headers: &HeaderMap) -> bool {
    headers.contains_key(A2A_INTERNAL_HEADER)
}

/// Per-request context threaded through the middleware chain.
pub struct RequestContext<'a> {
    pub provider: &'a Provider,
    pub config: &'a GatewayConfig,
    pub entered_at: Instant,
}

impl<'a> RequestContext<'a> {
    pub fn new(provider: &'a Provider, config: &'a GatewayConfig) -> Self {
        Self {
            provider,
            config,
            entered_at: Instant::now(),
        }
    }
}

/// Run the full entry chain — telemetry timestamping, then (if not an
/// A2A-internal request and MCP is enabled) tool-spec injection — against a
/// mutable chat-completion request before dispatch.
pub async fn run_entry_chain(
    ctx: &RequestContext<'_>,
    headers: &HeaderMap,
    request: &mut ChatCompletionRequest,
) -> Result<(), GatewayError> {
    telemetry::on_entry(ctx);

    if is_a2a_internal(headers) {
        return Ok(());
    }

    if ctx.config.mcp_enable {
        mcp::inject_tools(ctx, request).await?;
    }
    if ctx.config.a2a_enable {
        a2a::inject_tools(ctx, request).await?;
    }
    Ok(())
}

/// Run the exit chain in reverse entry order once a response has been
/// captured: A2A tool-call handling, then MCP tool-call handling, then
/// telemetry recording.
pub async fn run_exit_chain(
    ctx: &RequestContext<'_>,
    sink: &TelemetrySink,
    headers: &HeaderMap,
    status: u16,
    body: &mut serde_json::Value,
) -> Result<(), GatewayError> {
    if !is_a2a_internal(headers) {
        if ctx.config.a2a_enable {
            a2a::handle_tool_calls(ctx, body).await?;
        }
        if ctx.config.mcp_enable {
            mcp::handle_tool_calls(ctx, body).await?;
        }
    }
    telemetry::on_exit(ctx, sink, status, body);
    Ok(())
}
