//! A2A worker (C12): consumes jobs off a bounded queue, runs a bounded
//! tool-call loop against an upstream LLM via [`ClientWrapper`], and drives
//! each task through its state machine to a terminal state, sending push
//! notifications along the way (spec §4.7 "Worker loop").

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::gateway::a2a_server::push::send_push_notification;
use crate::gateway::a2a_server::task::{Task, TaskState, TaskStore};
use crate::gateway::error::GatewayError;
use crate::llm::client_wrapper::{ClientWrapper, Message, Role, ToolDefinition};
use crate::tools::tool_protocol::ToolRegistry;

/// One unit of work submitted to the worker: a task id plus the initial
/// user message content to drive it from.
pub struct WorkJob {
    pub task_id: String,
    pub input: String,
}

/// Handle used by the JSON-RPC-facing server code to enqueue work without
/// blocking the request thread (spec §4.7 "bounded, non-blocking enqueue").
#[derive(Clone)]
pub struct WorkerHandle {
    sender: mpsc::Sender<WorkJob>,
}

impl WorkerHandle {
    pub fn enqueue(&self, job: WorkJob) -> Result<(), GatewayError> {
        self.sender.try_send(job).map_err(|_| GatewayError::QueueFull)
    }
}

pub struct Worker;

impl Worker {
    /// Spawn the worker loop. `queue_capacity` bounds the channel so a burst
    /// of `message/send` calls fails fast with [`GatewayError::QueueFull`]
    /// instead of growing memory unboundedly.
    pub fn spawn(
        queue_capacity: usize,
        max_iterations: usize,
        task_store: TaskStore,
        client: Arc<dyn ClientWrapper>,
        tools: Arc<ToolRegistry>,
        http: reqwest::Client,
    ) -> WorkerHandle {
        let (sender, mut receiver) = mpsc::channel::<WorkJob>(queue_capacity);

        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                let task_store = task_store.clone();
                let client = client.clone();
                let tools = tools.clone();
                let http = http.clone();

                // Each job runs on its own task so a panic inside tool
                // execution or the client can't take the whole worker down.
                let handle = tokio::spawn(async move {
                    process_job(
                        job,
                        &task_store,
                        client.as_ref(),
                        tools.as_ref(),
                        max_iterations,
                        &http,
                    )
                    .await
                });

                if let Err(join_err) = handle.await {
                    log::error!("A2A worker job panicked: {}", join_err);
                }
            }
        });

        WorkerHandle { sender }
    }
}

async fn process_job(
    job: WorkJob,
    task_store: &TaskStore,
    client: &dyn ClientWrapper,
    tools: &ToolRegistry,
    max_iterations: usize,
    http: &reqwest::Client,
) {
    task_store
        .update(&job.task_id, |t| t.state = TaskState::Working)
        .await;
    notify(task_store, &job.task_id, http).await;

    let mut messages = vec![Message {
        role: Role::User,
        content: Arc::from(job.input.as_str()),
        tool_calls: vec![],
    }];

    let tool_defs = tool_definitions(tools).await;
    let mut final_content = String::new();
    let mut failure: Option<String> = None;

    for _ in 0..max_iterations {
        let response = match client.send_message(&messages, Some(tool_defs.clone())).await {
            Ok(m) => m,
            Err(e) => {
                failure = Some(e.to_string());
                break;
            }
        };

        if response.tool_calls.is_empty() {
            final_content = response.content.to_string();
            messages.push(response);
            break;
        }

        let assistant_calls = response.tool_calls.clone();
        messages.push(response);

        for call in assistant_calls {
            let outcome = tools.execute_tool(&call.name, call.arguments.clone()).await;
            let result = match outcome {
                Ok(r) if r.success => r.output.to_string(),
                Ok(r) => json!({ "error": r.error.unwrap_or_default() }).to_string(),
                Err(e) => json!({ "error": e.to_string() }).to_string(),
            };
            messages.push(Message {
                role: Role::Tool {
                    call_id: call.id.clone(),
                },
                content: Arc::from(result.as_str()),
                tool_calls: vec![],
            });
        }
    }

    task_store
        .update(&job.task_id, |t| {
            if let Some(err) = failure {
                t.state = TaskState::Failed;
                t.error = Some(err);
            } else {
                t.state = TaskState::Completed;
                t.result = Some(Value::String(final_content));
            }
        })
        .await;
    notify(task_store, &job.task_id, http).await;
}

async fn tool_definitions(tools: &ToolRegistry) -> Vec<ToolDefinition> {
    tools
        .list_tools()
        .into_iter()
        .map(|m| m.to_tool_definition())
        .collect()
}

async fn notify(task_store: &TaskStore, task_id: &str, http: &reqwest::Client) {
    let Some(task) = task_store.get(task_id).await else {
        return;
    };
    let Some(config) = task_store.push_config(task_id).await else {
        return;
    };
    send_push_notification(http, &config, &task).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ClientWrapper for StubClient {
        async fn send_message(
            &self,
            _messages: &[Message],
            _tools: Option<Vec<ToolDefinition>>,
        ) -> Result<Message, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Message {
                role: Role::Assistant,
                content: Arc::from("done"),
                tool_calls: vec![],
            })
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn process_job_completes_task_with_no_tool_calls() {
        let store = TaskStore::new();
        store.insert(Task::new("t1", json!({}))).await;
        let client = StubClient {
            calls: AtomicUsize::new(0),
        };
        let tools = ToolRegistry::new(Arc::new(crate::tools::custom::CustomToolProtocol::new()));
        let http = reqwest::Client::new();
        process_job(
            WorkJob {
                task_id: "t1".into(),
                input: "hello".into(),
            },
            &store,
            &client,
            &tools,
            5,
            &http,
        )
        .await;
        let task = store.get("t1").await.unwrap();
        assert_eq!(task.state, TaskState::Completed);
        assert_eq!(task.result, Some(Value::String("done".into())));
    }
}
