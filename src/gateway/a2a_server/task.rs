//! A2A task store: `task-id → Task` and `task-id → push notification config`
//! maps, both behind `tokio::sync::RwLock` (spec §4.7 "A2A server state").

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

/// Lifecycle state of an A2A task (spec §3 "Task states").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Submitted,
    Working,
    InputRequired,
    Completed,
    Canceled,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Canceled | TaskState::Failed
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub state: TaskState,
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, initial_message: Value) -> Self {
        Self {
            id: id.into(),
            state: TaskState::Submitted,
            messages: vec![initial_message],
            result: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushNotificationConfig {
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Shared task and push-notification-config state for the A2A server.
#[derive(Clone)]
pub struct TaskStore {
    tasks: Arc<RwLock<HashMap<String, Task>>>,
    push_configs: Arc<RwLock<HashMap<String, PushNotificationConfig>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            push_configs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn insert(&self, task: Task) {
        self.tasks.write().await.insert(task.id.clone(), task);
    }

    pub async fn get(&self, id: &str) -> Option<Task> {
        self.tasks.read().await.get(id).cloned()
    }

    pub async fn update<F: FnOnce(&mut Task)>(&self, id: &str, f: F) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(id)?;
        f(task);
        Some(task.clone())
    }

    pub async fn set_push_config(&self, task_id: &str, config: PushNotificationConfig) {
        self.push_configs
            .write()
            .await
            .insert(task_id.to_string(), config);
    }

    pub async fn push_config(&self, task_id: &str) -> Option<PushNotificationConfig> {
        self.push_configs.read().await.get(task_id).cloned()
    }

    /// Snapshot of every known task id, for the periodic cleanup sweep.
    pub async fn all_ids(&self) -> Vec<String> {
        self.tasks.read().await.keys().cloned().collect()
    }

    /// Drop terminal tasks and their push configs older than the configured
    /// cleanup interval — called periodically by the worker (spec §4.7
    /// "Cleanup").
    pub async fn sweep_terminal(&self, ids: &[String]) {
        let mut tasks = self.tasks.write().await;
        let mut push_configs = self.push_configs.write().await;
        for id in ids {
            if tasks.get(id).map(|t| t.state.is_terminal()).unwrap_or(false) {
                tasks.remove(id);
                push_configs.remove(id);
            }
        }
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
