//! A2A Agent Runtime (C12): JSON-RPC server exposing this gateway itself as
//! an agent-to-agent endpoint, backed by a bounded task queue and worker pool.

pub mod auth;
pub mod push;
pub mod task;
pub mod worker;

pub use auth::{AuthConfig, IpFilter};
pub use push::send_push_notification;
pub use task::{Task, TaskState, TaskStore};
pub use worker::{Worker, WorkerHandle};
