//! The gateway's single error taxonomy (spec §7), with conversions to the
//! HTTP surface (`IntoResponse`) and the JSON-RPC surface (`to_json_rpc_error`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

use crate::gateway::jsonrpc::JsonRpcError;

/// Taxonomy of errors the gateway can surface to a client, per spec §7.
#[derive(Debug)]
pub enum GatewayError {
    BadRequest(String),
    UnknownProvider(String),
    MissingCredential(String),
    ModelNotAllowed(String),
    UpstreamUnreachable(String),
    UpstreamTimeout(String),
    PayloadTooLarge,
    MethodNotFound(String),
    QueueFull,
    TaskNotFound(String),
    TaskAlreadyTerminal(String),
    Internal(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::BadRequest(m) => write!(f, "{}", m),
            GatewayError::UnknownProvider(m) => write!(f, "{}", m),
            GatewayError::MissingCredential(m) => write!(f, "{}", m),
            GatewayError::ModelNotAllowed(m) => write!(f, "{}", m),
            GatewayError::UpstreamUnreachable(m) => write!(f, "{}", m),
            GatewayError::UpstreamTimeout(m) => write!(f, "{}", m),
            GatewayError::PayloadTooLarge => write!(f, "Payload too large"),
            GatewayError::MethodNotFound(m) => write!(f, "Method not found: {}", m),
            GatewayError::QueueFull => write!(f, "Task queue is full"),
            GatewayError::TaskNotFound(id) => write!(f, "Task not found: {}", id),
            GatewayError::TaskAlreadyTerminal(id) => {
                write!(f, "Task {} is already in a terminal state", id)
            }
            GatewayError::Internal(m) => write!(f, "{}", m),
        }
    }
}

impl std::error::Error for GatewayError {}

impl GatewayError {
    /// HTTP mapping per spec §7 "HTTP mapping".
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::UnknownProvider(_) => StatusCode::BAD_REQUEST,
            GatewayError::MissingCredential(_) => StatusCode::BAD_REQUEST,
            GatewayError::ModelNotAllowed(_) => StatusCode::FORBIDDEN,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON-RPC mapping per spec §7 "JSON-RPC mapping".
    pub fn to_json_rpc_error(&self) -> JsonRpcError {
        match self {
            GatewayError::BadRequest(m) => JsonRpcError::invalid_params(m.clone()),
            GatewayError::MethodNotFound(m) => JsonRpcError::method_not_found(m),
            GatewayError::QueueFull => JsonRpcError::server_error(-32000, "Task queue is full"),
            GatewayError::TaskNotFound(id) => {
                JsonRpcError::server_error(-32000, format!("Task not found: {}", id))
            }
            GatewayError::TaskAlreadyTerminal(id) => JsonRpcError::server_error(
                -32000,
                format!("Task {} is already in a terminal state", id),
            ),
            other => JsonRpcError::internal_error(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

/// Error produced while loading [`crate::gateway::config::GatewayConfig`] from
/// the environment. The thin CLI turns this into process exit code 1.
#[derive(Debug)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_spec_mapping() {
        assert_eq!(
            GatewayError::ModelNotAllowed("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GatewayError::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            GatewayError::UpstreamUnreachable("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::UpstreamTimeout("x".into()).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            GatewayError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn queue_full_maps_to_generic_server_error_code() {
        let err = GatewayError::QueueFull.to_json_rpc_error();
        assert_eq!(err.code, -32000);
    }
}
