//! The gateway: an OpenAI-compatible proxy in front of heterogeneous LLM
//! providers, with MCP tool enrichment and an A2A agent runtime.

pub mod a2a_client;
pub mod a2a_server;
pub mod capture;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http_client_pool;
pub mod jsonrpc;
pub mod mcp_client;
pub mod middleware;
pub mod openai_types;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod telemetry_sink;
