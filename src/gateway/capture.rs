//! Response Capture (C6): buffers a unary upstream response so downstream
//! middlewares (telemetry, MCP tool-call parsing) can inspect its body
//! before it's sent on to the client, without disturbing streaming
//! responses, which bypass capture entirely (spec §4.6 "Capture").

use axum::body::Bytes;
use reqwest::Response;

use crate::gateway::error::GatewayError;

/// A captured upstream response: status, headers the gateway cares about,
/// and the full body read into memory. Only unary (non-streaming) responses
/// are captured; the dispatcher must check `stream` before constructing one.
pub struct CapturedResponse {
    pub status: reqwest::StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl CapturedResponse {
    /// Buffer-then-flush: read the whole upstream body into memory so it can
    /// be parsed and re-emitted. Never used on a streaming response.
    pub async fn from_upstream(response: Response) -> Result<Self, GatewayError> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))?;
        Ok(Self {
            status,
            content_type,
            body,
        })
    }

    pub fn json(&self) -> Result<serde_json::Value, GatewayError> {
        serde_json::from_slice(self.body.as_ref())
            .map_err(|e| GatewayError::UpstreamUnreachable(format!("invalid JSON body: {}", e)))
    }

    pub fn into_axum_response(self) -> axum::response::Response {
        use axum::response::IntoResponse;
        let mut builder = axum::http::Response::builder().status(self.status.as_u16());
        if let Some(ct) = &self.content_type {
            builder = builder.header(reqwest::header::CONTENT_TYPE.as_str(), ct.as_str());
        }
        builder
            .body(axum::body::Body::from(self.body))
            .unwrap()
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_parses_captured_body() {
        let captured = CapturedResponse {
            status: reqwest::StatusCode::OK,
            content_type: Some("application/json".into()),
            body: Bytes::from_static(br#"{"a":1}"#),
        };
        let value = captured.json().unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn json_on_non_json_body_is_upstream_error() {
        let captured = CapturedResponse {
            status: reqwest::StatusCode::OK,
            content_type: Some("text/plain".into()),
            body: Bytes::from_static(b"not json"),
        };
        assert!(captured.json().is_err());
    }
}
