// src/lib.rs

pub mod gateway;
pub mod llm;
pub mod tools;

// Re-exported for the client-wrapper crate's own internal callers
// (`llm::clients::*`, the A2A agent runtime's upstream-LLM calls).
pub use llm::client_wrapper::{ClientWrapper, Message, MessageChunk, Role, TokenUsage};
