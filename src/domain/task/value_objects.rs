use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a task across the whole catalog
///
/// Task numbers are only unique within a project, so every lookup in the
/// claim registry is keyed by the `(project_id, task_number)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskKey {
    pub project_id: u64,
    pub task_number: u64,
}

impl TaskKey {
    pub fn new(project_id: u64, task_number: u64) -> Self {
        Self {
            project_id,
            task_number,
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.project_id, self.task_number)
    }
}

/// Observable lifecycle state of a task
///
/// # State Machine
/// ```text
/// Open -> Claimed -> Completed
///   ^        |
///   |        └----> Escalated
///   └--------┘ (lease expiry or release)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// No live lease and no terminal status recorded
    Open,
    /// Held under a live lease
    Claimed,
    /// Reported done; terminal
    Completed,
    /// Handed off for human attention; terminal
    Escalated,
}

impl TaskState {
    /// Checks if a transition from current state to next state follows the
    /// lifecycle
    ///
    /// # Valid Transitions
    /// - Open -> Claimed
    /// - Claimed -> Open
    /// - Claimed -> Completed
    /// - Claimed -> Escalated
    ///
    /// # Example
    /// ```
    /// use hive_mock_api::domain::task::TaskState;
    ///
    /// assert!(TaskState::Open.can_transition_to(TaskState::Claimed));
    /// assert!(!TaskState::Completed.can_transition_to(TaskState::Open));
    /// ```
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        use TaskState::*;
        matches!(
            (self, next),
            (Open, Claimed) | (Claimed, Open) | (Claimed, Completed) | (Claimed, Escalated)
        )
    }

    /// Returns true for states nothing in the lifecycle leaves
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Escalated)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Open => write!(f, "open"),
            TaskState::Claimed => write!(f, "claimed"),
            TaskState::Completed => write!(f, "completed"),
            TaskState::Escalated => write!(f, "escalated"),
        }
    }
}

/// Status string reported by an agent
///
/// Any status is accepted. Only `completed` and `escalated` carry lifecycle
/// meaning; everything else is passed through to the activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    Escalated,
    Other(String),
}

impl TaskStatus {
    pub fn parse(status: &str) -> Self {
        match status.trim() {
            "completed" => TaskStatus::Completed,
            "escalated" => TaskStatus::Escalated,
            other => TaskStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::Escalated => "escalated",
            TaskStatus::Other(status) => status,
        }
    }

    /// The terminal lifecycle state this status moves a task into, if any
    pub fn terminal_state(&self) -> Option<TaskState> {
        match self {
            TaskStatus::Completed => Some(TaskState::Completed),
            TaskStatus::Escalated => Some(TaskState::Escalated),
            TaskStatus::Other(_) => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared edge from one task to another, possibly in another repository
///
/// Dependencies are metadata for agents to reason about. Nothing here
/// checks that the target exists or that the graph is acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Repository name of the project holding the target task
    pub repository: String,
    pub task_number: u64,
    /// Free-form classification, e.g. `api_contract` or `security`
    pub dependency_type: String,
}

impl Dependency {
    pub fn new(
        repository: impl Into<String>,
        task_number: u64,
        dependency_type: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            task_number,
            dependency_type: dependency_type.into(),
        }
    }
}

/// Identifier of a coordinating agent
///
/// # Invariants
/// - Not empty after trimming surrounding whitespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    /// Creates a new AgentId, trimming surrounding whitespace
    ///
    /// # Example
    /// ```
    /// use hive_mock_api::domain::task::AgentId;
    ///
    /// let agent = AgentId::new(" walnut-agent ").expect("valid agent id");
    /// assert_eq!(agent.as_str(), "walnut-agent");
    /// assert!(AgentId::new("   ").is_none());
    /// ```
    pub fn new(agent_id: impl AsRef<str>) -> Option<Self> {
        let trimmed = agent_id.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(AgentId(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transition_open_to_claimed() {
        assert!(TaskState::Open.can_transition_to(TaskState::Claimed));
    }

    #[test]
    fn valid_transition_claimed_back_to_open() {
        assert!(TaskState::Claimed.can_transition_to(TaskState::Open));
    }

    #[test]
    fn valid_transitions_claimed_to_terminal() {
        assert!(TaskState::Claimed.can_transition_to(TaskState::Completed));
        assert!(TaskState::Claimed.can_transition_to(TaskState::Escalated));
    }

    #[test]
    fn invalid_transition_open_to_completed() {
        assert!(!TaskState::Open.can_transition_to(TaskState::Completed));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for next in [
            TaskState::Open,
            TaskState::Claimed,
            TaskState::Completed,
            TaskState::Escalated,
        ] {
            assert!(!TaskState::Completed.can_transition_to(next));
            assert!(!TaskState::Escalated.can_transition_to(next));
        }
        assert!(TaskState::Completed.is_terminal());
        assert!(!TaskState::Claimed.is_terminal());
    }

    #[test]
    fn state_serializes_lowercase() {
        let json = serde_json::to_string(&TaskState::Escalated).unwrap();
        assert_eq!(json, "\"escalated\"");
        assert_eq!(TaskState::Open.to_string(), "open");
    }

    #[test]
    fn status_parse_recognises_lifecycle_statuses() {
        assert_eq!(TaskStatus::parse("completed"), TaskStatus::Completed);
        assert_eq!(TaskStatus::parse(" escalated "), TaskStatus::Escalated);
        assert_eq!(
            TaskStatus::parse("in_progress"),
            TaskStatus::Other("in_progress".to_string())
        );
        assert_eq!(TaskStatus::parse("in_progress").terminal_state(), None);
        assert_eq!(
            TaskStatus::Completed.terminal_state(),
            Some(TaskState::Completed)
        );
    }

    #[test]
    fn task_key_display() {
        assert_eq!(TaskKey::new(2, 23).to_string(), "2#23");
    }

    #[test]
    fn blank_agent_id_rejected() {
        assert!(AgentId::new("").is_none());
        assert!(AgentId::new("\t").is_none());
        assert_eq!(AgentId::new("a").unwrap().as_str(), "a");
    }
}
