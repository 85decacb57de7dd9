//! Local tool handlers and the tool-protocol abstraction that the A2A agent
//! runtime (see [`crate::gateway::a2a_server`]) uses to execute tool calls
//! whose name matches a known local handler.
//!
//! - [`tool_protocol`] — the `ToolProtocol` trait, `ToolRegistry`, and result/metadata types.
//! - [`resource_protocol`] — the optional `list_resources`/`read_resource` surface a protocol may support.
//! - [`custom`] — `CustomToolProtocol`, a registry of direct Rust function calls.
//! - `bash`, `calculator`, `filesystem`, `http_client`, `memory` — concrete, reusable tool
//!   implementations that get wrapped behind a `ToolProtocol` (via [`custom::CustomToolProtocol`])
//!   and registered with the agent runtime.

pub mod bash;
pub mod calculator;
pub mod custom;
pub mod filesystem;
pub mod http_client;
pub mod memory;
pub mod resource_protocol;
pub mod tool_protocol;

pub use bash::{BashError, BashResult, BashTool, Platform};
pub use calculator::{Calculator, CalculatorError, CalculatorResult};
pub use custom::CustomToolProtocol;
pub use filesystem::{DirectoryEntry, FileMetadata, FileSystemError, FileSystemTool};
pub use http_client::{HttpClient, HttpClientError, HttpResponse};
pub use memory::{Memory, MemoryMetadata};
pub use resource_protocol::{ResourceError, ResourceMetadata, ResourceProtocol};
pub use tool_protocol::{
    Tool, ToolError, ToolMetadata, ToolParameter, ToolParameterType, ToolProtocol, ToolRegistry,
    ToolResult,
};
