//! Request authentication (spec §4.4 "Auth"): a single shared bearer token
//! checked on every request when `ENABLE_AUTH` is set, reusing the
//! constant-time [`AuthConfig`](crate::gateway::a2a_server::auth::AuthConfig)
//! validator the A2A server's access control also relies on. `/health` is
//! always exempt.

use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::gateway::a2a_server::auth::AuthConfig;
use crate::gateway::config::GatewayConfig;

pub async fn require_auth(
    State(config): State<Arc<GatewayConfig>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if !config.enable_auth || request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let Some(token) = &config.auth_token else {
        log::warn!("ENABLE_AUTH is set but GATEWAY_AUTH_TOKEN is unconfigured; rejecting request");
        return (StatusCode::UNAUTHORIZED, "authentication not configured").into_response();
    };

    let auth_config = AuthConfig::bearer(token.clone());
    let authorized = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|header| auth_config.validate(header))
        .unwrap_or(false);

    if authorized {
        next.run(request).await
    } else {
        (StatusCode::UNAUTHORIZED, "missing or invalid Authorization header").into_response()
    }
}
