use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::task::{Dependency, TaskState};
use crate::domain::DomainError;

/// Who may mark a claimed task completed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionPolicy {
    /// Any agent may complete any task, claimed or not
    #[default]
    AnyAgent,
    /// While a live lease exists, only its holder may complete the task
    HolderOnly,
}

impl FromStr for CompletionPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "any_agent" => Ok(CompletionPolicy::AnyAgent),
            "holder_only" => Ok(CompletionPolicy::HolderOnly),
            other => Err(format!(
                "unknown completion policy '{}' (expected any_agent or holder_only)",
                other
            )),
        }
    }
}

impl fmt::Display for CompletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionPolicy::AnyAgent => write!(f, "any_agent"),
            CompletionPolicy::HolderOnly => write!(f, "holder_only"),
        }
    }
}

/// Claim lifetime and completion rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleSettings {
    pub claim_ttl: Duration,
    pub completion_policy: CompletionPolicy,
}

impl LifecycleSettings {
    pub fn new(
        claim_ttl: Duration,
        completion_policy: CompletionPolicy,
    ) -> Result<Self, DomainError> {
        if claim_ttl <= Duration::zero() {
            return Err(DomainError::NonPositiveTtl);
        }
        Ok(Self {
            claim_ttl,
            completion_policy,
        })
    }
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            claim_ttl: Duration::minutes(30),
            completion_policy: CompletionPolicy::AnyAgent,
        }
    }
}

/// Successful claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimReceipt {
    pub claim_id: String,
    pub holder: String,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A status report from an agent
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub project_id: u64,
    pub task_number: u64,
    pub status: String,
    pub agent_id: Option<String>,
    pub metadata: serde_json::Value,
}

/// What a status report changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOutcome {
    /// Terminal state recorded for the task, if the status has one
    pub recorded_state: Option<TaskState>,
    /// Holder of the lease the update removed
    pub released_holder: Option<String>,
}

/// Whether a dependency points at a task in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStatus {
    Resolved,
    Unknown,
}

/// A dependency as shown to agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyView {
    pub repository: String,
    pub task_number: u64,
    pub dependency_type: String,
    pub status: DependencyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
}

impl DependencyView {
    pub fn unknown(dependency: &Dependency) -> Self {
        Self {
            repository: dependency.repository.clone(),
            task_number: dependency.task_number,
            dependency_type: dependency.dependency_type.clone(),
            status: DependencyStatus::Unknown,
            project_id: None,
        }
    }

    pub fn resolved(dependency: &Dependency, project_id: u64) -> Self {
        Self {
            status: DependencyStatus::Resolved,
            project_id: Some(project_id),
            ..Self::unknown(dependency)
        }
    }
}

/// A catalog task with the current claim state overlaid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub number: u64,
    pub title: String,
    pub description: String,
    pub state: TaskState,
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    pub is_claimed: bool,
    pub assignees: Vec<String>,
    pub task_type: String,
    pub dependencies: Vec<DependencyView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_policy_parses_known_values() {
        assert_eq!(
            "any_agent".parse::<CompletionPolicy>(),
            Ok(CompletionPolicy::AnyAgent)
        );
        assert_eq!(
            " holder_only ".parse::<CompletionPolicy>(),
            Ok(CompletionPolicy::HolderOnly)
        );
        assert!("anyone".parse::<CompletionPolicy>().is_err());
        assert_eq!(CompletionPolicy::default().to_string(), "any_agent");
    }

    #[test]
    fn settings_reject_non_positive_ttl() {
        assert_eq!(
            LifecycleSettings::new(Duration::zero(), CompletionPolicy::AnyAgent),
            Err(DomainError::NonPositiveTtl)
        );
        assert!(
            LifecycleSettings::new(Duration::seconds(1), CompletionPolicy::HolderOnly).is_ok()
        );
        assert_eq!(LifecycleSettings::default().claim_ttl, Duration::minutes(30));
    }

    #[test]
    fn resolved_dependency_serializes_project() {
        let dependency = Dependency::new("bzzz", 23, "api_contract");
        let value = serde_json::to_value(DependencyView::resolved(&dependency, 2)).unwrap();
        assert_eq!(value["status"], "resolved");
        assert_eq!(value["project_id"], 2);

        let value = serde_json::to_value(DependencyView::unknown(&dependency)).unwrap();
        assert_eq!(value["status"], "unknown");
        assert!(value.get("project_id").is_none());
    }
}
