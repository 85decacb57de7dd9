//! Configuration loaded once at startup from environment variables (spec §6
//! "Environment configuration"). Deliberately avoids a config-file parsing
//! crate, following the minimalism of the upstream toolkit's own
//! `CloudLLMConfig` — `dotenvy` only optionally loads a `.env` file in
//! development, and everything else is `std::env::var` parsing by hand.

use std::collections::HashMap;
use std::time::Duration;

use crate::gateway::error::ConfigError;

/// General, server, client-pool, provider-credential, MCP/A2A, and OIDC
/// settings for one gateway process. Immutable after construction.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub application_name: String,
    pub environment: String,
    pub enable_telemetry: bool,
    pub enable_auth: bool,
    pub auth_token: Option<String>,
    pub allowed_models: Vec<String>,

    pub server_host: String,
    pub server_port: u16,
    pub server_read_timeout: Duration,
    pub server_write_timeout: Duration,
    pub server_idle_timeout: Duration,
    pub server_tls_cert_path: Option<String>,
    pub server_tls_key_path: Option<String>,

    pub client_timeout: Duration,
    pub client_max_idle_conns: usize,
    pub client_max_idle_conns_per_host: usize,
    pub client_idle_conn_timeout: Duration,

    /// `<PROVIDER>_API_URL` / `<PROVIDER>_API_KEY` pairs, keyed by lowercase provider id.
    pub provider_urls: HashMap<String, String>,
    pub provider_keys: HashMap<String, String>,

    pub mcp_enable: bool,
    pub mcp_servers: Vec<String>,

    pub a2a_enable: bool,
    pub a2a_expose: bool,
    pub a2a_agents: Vec<String>,
    pub a2a_queue_capacity: usize,
    pub a2a_max_chat_completion_iterations: usize,
    pub a2a_cleanup_interval: Duration,
    pub a2a_streaming_status_update_interval: Duration,

    pub oidc_issuer_url: Option<String>,
    pub oidc_client_id: Option<String>,
    pub oidc_client_secret: Option<String>,
}

const KNOWN_PROVIDERS: &[&str] = &[
    "openai", "anthropic", "groq", "google", "cohere", "cloudflare", "ollama", "deepseek",
];

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    match env_var(key) {
        Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

fn env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match env_var(key) {
        Some(v) => v
            .parse::<u64>()
            .map_err(|e| ConfigError(format!("{} must be an integer: {}", key, e))),
        None => Ok(default),
    }
}

fn env_csv(key: &str) -> Vec<String> {
    env_var(key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

impl GatewayConfig {
    /// Load configuration from process environment variables, optionally
    /// preceded by a `.env` file (development convenience, ignored if absent).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut provider_urls = HashMap::new();
        let mut provider_keys = HashMap::new();
        for provider in KNOWN_PROVIDERS {
            let upper = provider.to_uppercase();
            if let Some(url) = env_var(&format!("{}_API_URL", upper)) {
                provider_urls.insert(provider.to_string(), url);
            }
            if let Some(key) = env_var(&format!("{}_API_KEY", upper)) {
                provider_keys.insert(provider.to_string(), key);
            }
        }

        let server_port = match env_var("SERVER_PORT") {
            Some(v) => v
                .parse::<u16>()
                .map_err(|e| ConfigError(format!("SERVER_PORT must be a u16: {}", e)))?,
            None => 8080,
        };

        Ok(Self {
            application_name: env_var("APPLICATION_NAME").unwrap_or_else(|| "llm-gateway".into()),
            environment: env_var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            enable_telemetry: env_bool("ENABLE_TELEMETRY", true),
            enable_auth: env_bool("ENABLE_AUTH", false),
            auth_token: env_var("GATEWAY_AUTH_TOKEN"),
            allowed_models: env_csv("ALLOWED_MODELS")
                .into_iter()
                .map(|m| m.to_lowercase())
                .collect(),

            server_host: env_var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port,
            server_read_timeout: Duration::from_secs(env_u64("SERVER_READ_TIMEOUT", 60)?),
            server_write_timeout: Duration::from_secs(env_u64("SERVER_WRITE_TIMEOUT", 60)?),
            server_idle_timeout: Duration::from_secs(env_u64("SERVER_IDLE_TIMEOUT", 120)?),
            server_tls_cert_path: env_var("SERVER_TLS_CERT_PATH"),
            server_tls_key_path: env_var("SERVER_TLS_KEY_PATH"),

            client_timeout: Duration::from_secs(env_u64("CLIENT_TIMEOUT", 300)?),
            client_max_idle_conns: env_u64("CLIENT_MAX_IDLE_CONNS", 100)? as usize,
            client_max_idle_conns_per_host: env_u64("CLIENT_MAX_IDLE_CONNS_PER_HOST", 10)?
                as usize,
            client_idle_conn_timeout: Duration::from_secs(env_u64(
                "CLIENT_IDLE_CONN_TIMEOUT",
                90,
            )?),

            provider_urls,
            provider_keys,

            mcp_enable: env_bool("MCP_ENABLE", false),
            mcp_servers: env_csv("MCP_SERVERS"),

            a2a_enable: env_bool("A2A_ENABLE", false),
            a2a_expose: env_bool("A2A_EXPOSE", false),
            a2a_agents: env_csv("A2A_AGENTS"),
            a2a_queue_capacity: env_u64("A2A_QUEUE_CAPACITY", 256)? as usize,
            a2a_max_chat_completion_iterations: env_u64("MAX_CHAT_COMPLETION_ITERATIONS", 5)?
                as usize,
            a2a_cleanup_interval: Duration::from_secs(env_u64("A2A_CLEANUP_INTERVAL", 300)?),
            a2a_streaming_status_update_interval: Duration::from_millis(env_u64(
                "STREAMING_STATUS_UPDATE_INTERVAL",
                1000,
            )?),

            oidc_issuer_url: env_var("OIDC_ISSUER_URL"),
            oidc_client_id: env_var("OIDC_CLIENT_ID"),
            oidc_client_secret: env_var("OIDC_CLIENT_SECRET"),
        })
    }
}
