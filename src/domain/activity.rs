use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::task::LifecycleEvent;

/// Append-only records handed to the activity sink
///
/// Each variant is written to its own log. Records are never read back by
/// the coordination core.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityRecord {
    Coordination(CoordinationEntry),
    Work(WorkSubmission),
    PullRequest(PullRequestDraft),
    Discussion(CoordinationDiscussion),
    Prompt(AgentPrompt),
    Lifecycle(LifecycleEntry),
}

/// Log that a record kind is appended to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityCategory {
    Coordination,
    Work,
    PullRequest,
    Discussion,
    Prompt,
    Lifecycle,
}

impl ActivityCategory {
    /// Directory name under the sink root
    pub fn directory(&self) -> &'static str {
        match self {
            ActivityCategory::Coordination => "coordination_work",
            ActivityCategory::Work => "agent_work",
            ActivityCategory::PullRequest => "pull_requests",
            ActivityCategory::Discussion => "coordination_discussions",
            ActivityCategory::Prompt => "agent_prompts",
            ActivityCategory::Lifecycle => "lifecycle",
        }
    }

    /// Prefix of the daily `.jsonl` log file
    pub fn log_prefix(&self) -> &'static str {
        match self {
            ActivityCategory::Coordination => "coordination_work",
            ActivityCategory::Work => "agent_work_log",
            ActivityCategory::PullRequest => "pull_requests_log",
            ActivityCategory::Discussion => "coordination_discussions",
            ActivityCategory::Prompt => "agent_prompts_log",
            ActivityCategory::Lifecycle => "lifecycle_log",
        }
    }
}

/// Coordination activity types whose entries also get a standalone file
const STANDALONE_COORDINATION_TYPES: [&str; 3] =
    ["code_generation", "task_solution", "pull_request_content"];

impl ActivityRecord {
    pub fn category(&self) -> ActivityCategory {
        match self {
            ActivityRecord::Coordination(_) => ActivityCategory::Coordination,
            ActivityRecord::Work(_) => ActivityCategory::Work,
            ActivityRecord::PullRequest(_) => ActivityCategory::PullRequest,
            ActivityRecord::Discussion(_) => ActivityCategory::Discussion,
            ActivityRecord::Prompt(_) => ActivityCategory::Prompt,
            ActivityRecord::Lifecycle(_) => ActivityCategory::Lifecycle,
        }
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        match self {
            ActivityRecord::Coordination(entry) => entry.recorded_at,
            ActivityRecord::Work(work) => work.submitted_at,
            ActivityRecord::PullRequest(pr) => pr.created_at,
            ActivityRecord::Discussion(discussion) => discussion.recorded_at,
            ActivityRecord::Prompt(prompt) => prompt.recorded_at,
            ActivityRecord::Lifecycle(entry) => entry.recorded_at,
        }
    }

    /// File stem for the standalone pretty-printed copy of this record
    ///
    /// Returns `None` for records that only go to the daily log.
    pub fn standalone_stem(&self) -> Option<String> {
        let time = self.recorded_at().format("%H%M%S");
        match self {
            ActivityRecord::Coordination(entry) => {
                if STANDALONE_COORDINATION_TYPES.contains(&entry.activity_type.as_str()) {
                    Some(format!("{}_{}", entry.activity_type, time))
                } else {
                    None
                }
            }
            ActivityRecord::Work(work) => Some(format!(
                "work_p{}_t{}_{}_{}",
                work.project_id,
                work.task_number,
                sanitize_file_component(&work.agent_id),
                time
            )),
            ActivityRecord::PullRequest(pr) => Some(format!(
                "pr_p{}_t{}_{}_{}",
                pr.project_id,
                pr.task_number,
                sanitize_file_component(&pr.agent_id),
                time
            )),
            ActivityRecord::Discussion(discussion) => Some(format!(
                "discussion_{}_p{}_{}",
                sanitize_file_component(&discussion.discussion_type),
                discussion.project_id,
                time
            )),
            ActivityRecord::Prompt(prompt) => Some(format!(
                "prompt_{}_p{}_t{}_{}_{}",
                sanitize_file_component(&prompt.prompt_type),
                prompt.project_id,
                prompt.task_number,
                sanitize_file_component(&prompt.agent_id),
                time
            )),
            ActivityRecord::Lifecycle(_) => None,
        }
    }
}

/// Makes an agent-supplied string safe to embed in a file name
pub fn sanitize_file_component(agent_id: &str) -> String {
    agent_id.replace(['/', '\\'], "_")
}

/// Free-form coordination activity reported by an agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinationEntry {
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub details: Value,
    pub session_id: String,
}

impl CoordinationEntry {
    /// Builds an entry, taking the session id from `details.session_id`
    pub fn new(
        activity_type: impl Into<String>,
        details: Value,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        let session_id = details
            .get("session_id")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        Self {
            recorded_at,
            activity_type: activity_type.into(),
            details,
            session_id,
        }
    }
}

/// Work product an agent submitted for a task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkSubmission {
    pub project_id: u64,
    pub task_number: u64,
    pub agent_id: String,
    pub work_type: String,
    pub content: String,
    pub files: BTreeMap<String, String>,
    pub commit_message: String,
    pub description: String,
    pub submitted_at: DateTime<Utc>,
}

/// Pull request content an agent would have opened
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRequestDraft {
    pub project_id: u64,
    pub task_number: u64,
    pub agent_id: String,
    pub title: String,
    pub description: String,
    pub files_changed: BTreeMap<String, String>,
    pub branch_name: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

/// Transcript of a multi-agent coordination discussion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinationDiscussion {
    pub project_id: u64,
    #[serde(rename = "type")]
    pub discussion_type: String,
    pub participants: Vec<Value>,
    pub messages: Vec<Value>,
    pub decisions: Vec<Value>,
    pub context: Value,
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
}

/// Prompt an agent received or generated, with the model it went to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentPrompt {
    pub project_id: u64,
    pub task_number: u64,
    pub agent_id: String,
    pub prompt_type: String,
    pub prompt_content: String,
    pub context: Value,
    pub model_used: String,
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
}

/// Lifecycle transition emitted by the coordination core
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleEntry {
    pub project_id: u64,
    pub task_number: u64,
    pub agent_id: Option<String>,
    pub event: String,
    pub details: Value,
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
}

impl LifecycleEntry {
    pub fn from_event(event: &LifecycleEvent, recorded_at: DateTime<Utc>) -> Self {
        let key = event.key();
        Self {
            project_id: key.project_id,
            task_number: key.task_number,
            agent_id: event.agent_id().map(str::to_string),
            event: event.name().to_string(),
            details: event.details(),
            recorded_at,
        }
    }
}
