use super::value_objects::TaskKey;
use chrono::{DateTime, Utc};

/// Events raised as tasks move through their lifecycle
///
/// These are what the lifecycle controller forwards to the activity sink,
/// so the coordination log shows who held what and when.
///
/// # Example
/// ```
/// use hive_mock_api::domain::task::{LifecycleEvent, TaskKey};
/// use chrono::Utc;
///
/// let event = LifecycleEvent::Claimed {
///     key: TaskKey::new(2, 23),
///     agent_id: "agent-a".to_string(),
///     claim_id: "2-23-agent-a-1736848800".to_string(),
///     expires_at: Utc::now(),
/// };
/// assert_eq!(event.name(), "task_claimed");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// An agent acquired the lease on a task
    Claimed {
        key: TaskKey,
        agent_id: String,
        claim_id: String,
        expires_at: DateTime<Utc>,
    },
    /// The holder gave the lease back before it expired
    Released { key: TaskKey, agent_id: String },
    /// A task was reported done; `released_holder` is whoever held the lease
    Completed {
        key: TaskKey,
        reported_by: Option<String>,
        released_holder: Option<String>,
    },
    /// A task was escalated for outside attention
    Escalated {
        key: TaskKey,
        reported_by: Option<String>,
        metadata: serde_json::Value,
    },
    /// Any other status an agent chose to report
    StatusReported {
        key: TaskKey,
        status: String,
        reported_by: Option<String>,
    },
}

impl LifecycleEvent {
    pub fn key(&self) -> TaskKey {
        match self {
            LifecycleEvent::Claimed { key, .. } => *key,
            LifecycleEvent::Released { key, .. } => *key,
            LifecycleEvent::Completed { key, .. } => *key,
            LifecycleEvent::Escalated { key, .. } => *key,
            LifecycleEvent::StatusReported { key, .. } => *key,
        }
    }

    /// Stable event name used in activity records
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Claimed { .. } => "task_claimed",
            LifecycleEvent::Released { .. } => "task_released",
            LifecycleEvent::Completed { .. } => "task_completed",
            LifecycleEvent::Escalated { .. } => "task_escalated",
            LifecycleEvent::StatusReported { .. } => "status_reported",
        }
    }

    /// The agent responsible for the event, when known
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            LifecycleEvent::Claimed { agent_id, .. } => Some(agent_id),
            LifecycleEvent::Released { agent_id, .. } => Some(agent_id),
            LifecycleEvent::Completed {
                reported_by,
                released_holder,
                ..
            } => reported_by.as_deref().or(released_holder.as_deref()),
            LifecycleEvent::Escalated { reported_by, .. } => reported_by.as_deref(),
            LifecycleEvent::StatusReported { reported_by, .. } => reported_by.as_deref(),
        }
    }

    /// Event-specific payload for the activity log
    pub fn details(&self) -> serde_json::Value {
        match self {
            LifecycleEvent::Claimed {
                claim_id,
                expires_at,
                ..
            } => serde_json::json!({
                "claim_id": claim_id,
                "expires_at": expires_at,
            }),
            LifecycleEvent::Released { .. } => serde_json::json!({}),
            LifecycleEvent::Completed {
                released_holder, ..
            } => serde_json::json!({ "released_holder": released_holder }),
            LifecycleEvent::Escalated { metadata, .. } => metadata.clone(),
            LifecycleEvent::StatusReported { status, .. } => {
                serde_json::json!({ "status": status })
            }
        }
    }
}
