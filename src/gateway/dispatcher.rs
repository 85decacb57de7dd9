//! Dispatcher (C5): sends a resolved chat-completion request upstream,
//! either unary or as a forwarded SSE stream, and fans a `/v1/models`
//! request out across every configured provider (spec §4.3 "Dispatch").

use std::time::Duration;

use async_stream::stream;
use axum::body::Body;
use axum::response::{IntoResponse, Response};
use futures_util::future::join_all;
use futures_util::StreamExt;

use crate::gateway::capture::CapturedResponse;
use crate::gateway::config::GatewayConfig;
use crate::gateway::error::GatewayError;
use crate::gateway::openai_types::{ChatCompletionRequest, Model, ModelList};
use crate::gateway::registry::Provider;

/// Maximum upstream response body the gateway will buffer for a unary
/// (non-streaming) response, per spec §4.3 "Payload limits".
pub const MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

/// Send a unary chat-completion request upstream and buffer its response.
pub async fn dispatch_unary(
    provider: &Provider,
    request: &ChatCompletionRequest,
) -> Result<CapturedResponse, GatewayError> {
    let builder = provider.client.post(provider.chat_url()).json(request);
    let builder = provider.authorize(builder);

    let response = builder.send().await.map_err(|e| {
        if e.is_timeout() {
            GatewayError::UpstreamTimeout(e.to_string())
        } else {
            GatewayError::UpstreamUnreachable(e.to_string())
        }
    })?;

    if let Some(len) = response.content_length() {
        if len as usize > MAX_RESPONSE_BYTES {
            return Err(GatewayError::PayloadTooLarge);
        }
    }

    CapturedResponse::from_upstream(response).await
}

/// Send a streaming chat-completion request upstream and forward it as a
/// line-buffered SSE stream, terminating at the `data: [DONE]` sentinel
/// regardless of whether upstream ever sends one itself (spec §4.3
/// "Streaming forwarding", spec.md:60/:216). `on_complete` fires exactly
/// once, with the upstream status and the last `data:` payload that
/// carried a non-null `usage` field (falling back to the last parseable
/// payload at all), so the caller can still record telemetry for a
/// response whose bytes have already reached the client.
pub async fn dispatch_streaming<F>(
    provider: &Provider,
    request: &ChatCompletionRequest,
    on_complete: F,
) -> Result<Response, GatewayError>
where
    F: FnOnce(u16, Option<serde_json::Value>) + Send + 'static,
{
    let builder = provider.client.post(provider.chat_url()).json(request);
    let builder = provider.authorize(builder);

    let upstream = builder.send().await.map_err(|e| {
        if e.is_timeout() {
            GatewayError::UpstreamTimeout(e.to_string())
        } else {
            GatewayError::UpstreamUnreachable(e.to_string())
        }
    })?;

    let status = upstream.status().as_u16();
    if !upstream.status().is_success() {
        on_complete(status, None);
        return Ok(CapturedResponse::from_upstream(upstream)
            .await?
            .into_axum_response());
    }

    const DONE_LINE: &[u8] = b"data: [DONE]\n\n";

    let body_stream = stream! {
        let mut byte_stream = upstream.bytes_stream();
        let mut buffer: Vec<u8> = Vec::with_capacity(4096);
        let mut last_with_usage: Option<serde_json::Value> = None;
        let mut last_any: Option<serde_json::Value> = None;
        let mut sent_done = false;
        while let Some(chunk) = byte_stream.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    on_complete(status, last_with_usage.or(last_any));
                    yield Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
                    return;
                }
            };
            buffer.extend_from_slice(&chunk);
            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let trimmed_end = line
                    .iter()
                    .rposition(|&b| !matches!(b, b'\r' | b'\n'))
                    .map(|end| end + 1)
                    .unwrap_or(0);
                let trimmed = &line[..trimmed_end];
                let is_done = trimmed == b"data: [DONE]";
                if let Some(payload) = trimmed.strip_prefix(b"data: ") {
                    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(payload) {
                        if value.get("usage").map(|u| !u.is_null()).unwrap_or(false) {
                            last_with_usage = Some(value.clone());
                        }
                        last_any = Some(value);
                    }
                }
                yield Ok(line.clone().into());
                if is_done {
                    sent_done = true;
                    on_complete(status, last_with_usage.or(last_any));
                    return;
                }
            }
        }
        if !buffer.is_empty() {
            yield Ok(buffer.into());
        }
        if !sent_done {
            yield Ok(DONE_LINE.to_vec().into());
        }
        on_complete(status, last_with_usage.or(last_any));
    };

    Ok(Response::builder()
        .header(axum::http::header::CONTENT_TYPE, "text/event-stream")
        .header(axum::http::header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(body_stream))
        .unwrap()
        .into_response())
}

/// Fan `GET /v1/models` out across every configured provider concurrently
/// and merge the results, filtered by `ALLOWED_MODELS` when configured
/// (spec §4.3 "Model listing").
pub async fn list_models(
    providers: Vec<Provider>,
    config: &GatewayConfig,
) -> ModelList {
    let tasks: Vec<_> = providers
        .into_iter()
        .map(|provider| {
            tokio::spawn(async move { fetch_models_for_provider(&provider).await })
        })
        .collect();

    let results = join_all(tasks).await;
    let mut data = Vec::new();
    for result in results {
        if let Ok(Ok(models)) = result {
            data.extend(models);
        }
    }

    if !config.allowed_models.is_empty() {
        data.retain(|m: &Model| {
            config
                .allowed_models
                .iter()
                .any(|allowed| allowed == &m.id.to_lowercase())
        });
    }

    ModelList {
        object: "list".to_string(),
        data,
    }
}

async fn fetch_models_for_provider(provider: &Provider) -> Result<Vec<Model>, GatewayError> {
    let builder = provider.client.get(provider.models_url());
    let builder = provider.authorize(builder);
    let response = builder
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))?;
    let captured = CapturedResponse::from_upstream(response).await?;
    let value = captured.json()?;

    let entries = value
        .get("data")
        .and_then(|d| d.as_array())
        .cloned()
        .unwrap_or_default();

    Ok(entries
        .into_iter()
        .filter_map(|entry| entry.get("id").and_then(|v| v.as_str()).map(String::from))
        .map(|id| Model {
            id,
            object: "model".to_string(),
            created: 0,
            owned_by: provider.def.id.to_string(),
            served_by: provider.def.display_name.to_string(),
        })
        .collect())
}
