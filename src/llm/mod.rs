//! Upstream-LLM client abstraction used by the A2A agent runtime.
//!
//! The gateway's own client-facing dispatcher (see [`crate::gateway::dispatcher`])
//! talks to upstream providers over raw HTTP/SSE and never goes through this
//! module — it only needs the shared [`crate::gateway::http_client_pool`].
//! `llm` exists for the A2A agent runtime's own internal calls: when the
//! runtime's worker loop needs to call "the LLM" to drive its tool-call loop
//! (spec §4.7 "Processing logic"), it does so through [`client_wrapper::ClientWrapper`],
//! exactly as this module's originating toolkit's agents did.

pub mod client_wrapper;
pub mod clients;

pub use client_wrapper::{ClientWrapper, Message, MessageChunk, Role, TokenUsage};
