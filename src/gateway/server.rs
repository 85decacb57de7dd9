//! HTTP surface (spec §6 "Routes"): assembles the axum [`Router`] serving
//! health, model listing, chat completions, raw provider proxying, and the
//! A2A JSON-RPC + agent-card endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{any, get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::gateway::a2a_client::AgentCard;
use crate::gateway::a2a_server::worker::{WorkJob, WorkerHandle};
use crate::gateway::a2a_server::task::{PushNotificationConfig, Task, TaskState, TaskStore};
use crate::gateway::config::GatewayConfig;
use crate::gateway::dispatcher::{self, MAX_RESPONSE_BYTES};
use crate::gateway::error::GatewayError;
use crate::gateway::jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::gateway::middleware::{self, RequestContext};
use crate::gateway::openai_types::ChatCompletionRequest;
use crate::gateway::registry::ProviderRegistry;
use crate::gateway::resolver;
use crate::gateway::telemetry_sink::TelemetrySink;

/// Shared application state handed to every axum handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub registry: Arc<ProviderRegistry>,
    pub telemetry: Arc<TelemetrySink>,
    pub task_store: TaskStore,
    pub worker: Option<WorkerHandle>,
    pub agent_card: Option<AgentCard>,
}

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();
    let read_timeout = config.server_read_timeout;
    Router::new()
        .route("/health", get(health))
        .route("/v1/models", get(list_models))
        .route("/v1/chat/completions", post(chat_completions))
        .route("/proxy/{provider}/{*path}", any(raw_proxy))
        .route("/a2a", post(a2a_rpc))
        .route("/.well-known/agent.json", get(agent_card))
        .route("/a2a/agents", get(a2a_agents))
        .fallback(not_found)
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(
            config,
            crate::gateway::middleware::auth::require_auth,
        ))
        .layer(
            tower::ServiceBuilder::new()
                .layer(tower_http::trace::TraceLayer::new_for_http())
                .layer(tower_http::cors::CorsLayer::permissive())
                .layer(axum::error_handling::HandleErrorLayer::new(handle_middleware_error))
                .load_shed()
                .timeout(read_timeout),
        )
        // Bounds the inbound body reader for /v1/chat/completions (and every
        // other route) at the same 10 MiB cap enforced against upstream
        // responses, per spec §4.3 "Payload limits" (10 MiB + 1 byte -> 413).
        .layer(axum::extract::DefaultBodyLimit::max(MAX_RESPONSE_BYTES))
}

/// Converts a `tower` middleware failure (timeout, load-shed rejection) into
/// a response — `axum::Router` requires an infallible service, so layers
/// like [`tower::timeout::TimeoutLayer`] must be paired with a
/// `HandleErrorLayer` (spec §6 "Server timeouts").
async fn handle_middleware_error(err: tower::BoxError) -> impl IntoResponse {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::GATEWAY_TIMEOUT, "request timed out").into_response()
    } else if err.is::<tower::load_shed::error::Overloaded>() {
        (StatusCode::SERVICE_UNAVAILABLE, "server overloaded").into_response()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("unhandled middleware error: {err}")).into_response()
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

#[derive(Debug, Deserialize)]
struct ProviderQuery {
    provider: Option<String>,
}

async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ProviderQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let provider_ids = match &query.provider {
        Some(p) => vec![
            crate::gateway::catalog::lookup(&p.to_lowercase())
                .map(|d| d.id)
                .ok_or_else(|| GatewayError::UnknownProvider(crate::gateway::registry::unknown_provider_message()))?,
        ],
        None => state.registry.configured_provider_ids(),
    };

    let providers = provider_ids
        .into_iter()
        .filter_map(|id| state.registry.build(id).ok())
        .collect();

    let list = dispatcher::list_models(providers, &state.config).await;
    Ok(Json(list))
}

async fn chat_completions(
    State(state): State<AppState>,
    Query(query): Query<ProviderQuery>,
    headers: HeaderMap,
    Json(mut request): Json<ChatCompletionRequest>,
) -> Result<Response, GatewayError> {
    let (provider_id, bare_model) = resolver::resolve(&request.model, query.provider.as_deref())?;

    if !state.config.allowed_models.is_empty()
        && !state
            .config
            .allowed_models
            .iter()
            .any(|m| m == &bare_model.to_lowercase())
    {
        return Err(GatewayError::ModelNotAllowed(format!(
            "model '{}' is not in the configured allow-list",
            request.model
        )));
    }

    request.model = bare_model.to_string();
    let provider = state.registry.build(provider_id)?;

    let ctx = RequestContext::new(&provider, &state.config);
    middleware::run_entry_chain(&ctx, &headers, &mut request).await?;

    if request.stream {
        let provider_id = provider.def.id;
        let entered_at = ctx.entered_at;
        let sink = state.telemetry.clone();
        return dispatcher::dispatch_streaming(&provider, &request, move |status, last_chunk| {
            let body = last_chunk.unwrap_or(Value::Null);
            middleware::telemetry::on_exit_streaming(
                provider_id,
                entered_at.elapsed(),
                &sink,
                status,
                &body,
            );
        })
        .await;
    }

    let started = Instant::now();
    let captured = dispatcher::dispatch_unary(&provider, &request).await?;
    let status = captured.status.as_u16();
    let mut body = captured.json().unwrap_or(Value::Null);

    middleware::run_exit_chain(&ctx, &state.telemetry, &headers, status, &mut body).await?;
    let _ = started;

    Ok((
        StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
        Json(body),
    )
        .into_response())
}

async fn raw_proxy(
    State(state): State<AppState>,
    Path((provider_id, path)): Path<(String, String)>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Response, GatewayError> {
    if body.len() > MAX_RESPONSE_BYTES {
        return Err(GatewayError::PayloadTooLarge);
    }
    let provider = state.registry.build(&provider_id.to_lowercase())?;
    let url = format!("{}/{}", provider.base_url, path.trim_start_matches('/'));
    let mut builder = provider.client.post(&url).body(body.to_vec());
    builder = provider.authorize(builder);
    if let Some(ct) = headers.get(axum::http::header::CONTENT_TYPE) {
        builder = builder.header(axum::http::header::CONTENT_TYPE, ct);
    }
    let response = builder
        .send()
        .await
        .map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))?;
    let captured = crate::gateway::capture::CapturedResponse::from_upstream(response).await?;
    Ok(captured.into_axum_response())
}

async fn agent_card(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    match &state.agent_card {
        Some(card) => Ok(Json(serde_json::to_value(card).unwrap())),
        None => Err(GatewayError::Internal("A2A exposure is disabled".into())),
    }
}

async fn a2a_agents(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "agents": state.config.a2a_agents }))
}

async fn a2a_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    if request.method == "message/stream" {
        return handle_message_stream(&state, request).await;
    }
    let id = request.id.clone();
    let result = handle_a2a_method(&state, request).await;
    Json(match result {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(err) => JsonRpcResponse::failure(id, err),
    })
    .into_response()
}

/// Creates the task backing a `message/send` or `message/stream` call and
/// enqueues it on the worker, transitioning the task to `failed` (instead of
/// leaving it stuck `submitted`) if the queue rejects it (spec.md:146).
async fn submit_message(state: &AppState, params: &Value) -> Result<String, JsonRpcError> {
    let Some(worker) = &state.worker else {
        return Err(JsonRpcError::internal_error("A2A runtime is disabled"));
    };
    let message = params.get("message");
    let skill_hint = params
        .get("metadata")
        .and_then(|m| m.get("skill"))
        .and_then(|s| s.as_str());
    let text_part = message
        .and_then(|m| m.get("parts"))
        .and_then(|p| p.as_array())
        .into_iter()
        .flatten()
        .find(|p| p.get("kind").and_then(|k| k.as_str()) == Some("text"))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str());

    let input = match (skill_hint, text_part) {
        (Some(skill), Some(text)) => format!("[skill: {}] {}", skill, text),
        (Some(skill), None) => format!("[skill: {}]", skill),
        (None, Some(text)) => text.to_string(),
        (None, None) => String::new(),
    };

    let task_id = uuid::Uuid::new_v4().to_string();
    state
        .task_store
        .insert(Task::new(task_id.clone(), params.clone()))
        .await;
    if let Err(e) = worker.enqueue(WorkJob {
        task_id: task_id.clone(),
        input,
    }) {
        state
            .task_store
            .update(&task_id, |t| t.state = TaskState::Failed)
            .await;
        return Err(e.to_json_rpc_error());
    }
    Ok(task_id)
}

/// `message/stream` (spec.md:134/:138): submits the task exactly like
/// `message/send`, then holds the connection open as an SSE stream of
/// JSON-RPC-wrapped task status updates, ending in a terminal update
/// followed by `data: [DONE]\n\n`.
async fn handle_message_stream(state: &AppState, request: JsonRpcRequest) -> Response {
    let id = request.id.clone();
    let task_id = match submit_message(state, &request.params).await {
        Ok(task_id) => task_id,
        Err(err) => return Json(JsonRpcResponse::failure(id, err)).into_response(),
    };

    let task_store = state.task_store.clone();
    let interval = state.config.a2a_streaming_status_update_interval;

    let body_stream = async_stream::stream! {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            let Some(task) = task_store.get(&task_id).await else { break; };
            let is_final = task.state.is_terminal();
            let event = JsonRpcResponse::success(
                id.clone(),
                json!({ "taskId": task.id, "status": task.state, "final": is_final, "task": task }),
            );
            let line = format!(
                "data: {}\n\n",
                serde_json::to_string(&event).unwrap_or_default()
            );
            yield Ok::<_, std::io::Error>(axum::body::Bytes::from(line));
            if is_final {
                break;
            }
        }
        yield Ok(axum::body::Bytes::from_static(b"data: [DONE]\n\n"));
    };

    Response::builder()
        .header(axum::http::header::CONTENT_TYPE, "text/event-stream")
        .header(axum::http::header::CACHE_CONTROL, "no-cache")
        .body(axum::body::Body::from_stream(body_stream))
        .unwrap()
        .into_response()
}

async fn handle_a2a_method(
    state: &AppState,
    request: JsonRpcRequest,
) -> Result<Value, JsonRpcError> {
    match request.method.as_str() {
        "message/send" => {
            let task_id = submit_message(state, &request.params).await?;
            Ok(json!({ "id": task_id, "state": "submitted" }))
        }
        "tasks/get" => {
            let id = request
                .params
                .get("id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| JsonRpcError::invalid_params("missing `id`"))?;
            let task = state
                .task_store
                .get(id)
                .await
                .ok_or_else(|| GatewayError::TaskNotFound(id.to_string()).to_json_rpc_error())?;
            Ok(serde_json::to_value(task).unwrap())
        }
        "tasks/cancel" => {
            let id = request
                .params
                .get("id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| JsonRpcError::invalid_params("missing `id`"))?;
            let existing = state
                .task_store
                .get(id)
                .await
                .ok_or_else(|| GatewayError::TaskNotFound(id.to_string()).to_json_rpc_error())?;
            if existing.state.is_terminal() {
                return Err(GatewayError::TaskAlreadyTerminal(id.to_string()).to_json_rpc_error());
            }
            let task = state
                .task_store
                .update(id, |t| t.state = TaskState::Canceled)
                .await
                .ok_or_else(|| GatewayError::TaskNotFound(id.to_string()).to_json_rpc_error())?;
            Ok(serde_json::to_value(task).unwrap())
        }
        "tasks/pushNotificationConfig/set" => {
            let id = request
                .params
                .get("id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| JsonRpcError::invalid_params("missing `id`"))?;
            let url = request
                .params
                .get("url")
                .and_then(|v| v.as_str())
                .ok_or_else(|| JsonRpcError::invalid_params("missing `url`"))?;
            let token = request
                .params
                .get("token")
                .and_then(|v| v.as_str())
                .map(String::from);
            state
                .task_store
                .set_push_config(id, PushNotificationConfig { url: url.to_string(), token })
                .await;
            Ok(json!({ "ok": true }))
        }
        "tasks/pushNotificationConfig/get" => {
            let id = request
                .params
                .get("id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| JsonRpcError::invalid_params("missing `id`"))?;
            match state.task_store.push_config(id).await {
                Some(config) => Ok(serde_json::to_value(config).unwrap()),
                None => Ok(Value::Null),
            }
        }
        other => Err(JsonRpcError::method_not_found(other)),
    }
}
