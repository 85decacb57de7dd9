//! Push notifications: best-effort POST of a task's current state to its
//! registered push-notification URL, with a 10s timeout (spec §4.7 "Push
//! notifications"). A delivery failure is logged, never propagated — a
//! subscriber's downtime must not affect task processing.

use std::time::Duration;

use crate::gateway::a2a_server::task::{PushNotificationConfig, Task};

const PUSH_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn send_push_notification(
    client: &reqwest::Client,
    config: &PushNotificationConfig,
    task: &Task,
) {
    let envelope = serde_json::json!({
        "taskId": task.id,
        "status": { "state": task.state },
        "task": task,
    });
    let mut builder = client
        .post(&config.url)
        .json(&envelope)
        .timeout(PUSH_TIMEOUT);
    if let Some(token) = &config.token {
        builder = builder.bearer_auth(token);
    }
    if let Err(e) = builder.send().await {
        log::warn!(
            "push notification for task {} to {} failed: {}",
            task.id,
            config.url,
            e
        );
    }
}
