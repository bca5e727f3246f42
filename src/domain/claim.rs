use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::task::{TaskKey, TaskState};

/// Time-bounded exclusive claim on a task
///
/// A lease is live while `now - acquired_at < ttl`. Once that no longer
/// holds the lease is treated as released, whether or not anything has
/// removed it from the registry yet.
///
/// # Example
/// ```
/// use hive_mock_api::domain::claim::Lease;
/// use hive_mock_api::domain::task::TaskKey;
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// let lease = Lease::new(TaskKey::new(2, 23), "agent-a", now, Duration::minutes(30));
///
/// assert!(lease.is_live_at(now + Duration::minutes(29)));
/// assert!(!lease.is_live_at(now + Duration::minutes(30)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    holder: String,
    claim_id: String,
    acquired_at: DateTime<Utc>,
    ttl: Duration,
}

impl Lease {
    /// Creates a lease whose claim id follows the
    /// `{project}-{task}-{agent}-{unix seconds}` format agents already log
    pub fn new(
        key: TaskKey,
        holder: impl Into<String>,
        acquired_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let holder = holder.into();
        let claim_id = format!(
            "{}-{}-{}-{}",
            key.project_id,
            key.task_number,
            holder,
            acquired_at.timestamp()
        );

        Self {
            holder,
            claim_id,
            acquired_at,
            ttl,
        }
    }

    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now - self.acquired_at < self.ttl
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.acquired_at + self.ttl
    }

    pub fn is_held_by(&self, agent_id: &str) -> bool {
        self.holder == agent_id
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }

    pub fn claim_id(&self) -> &str {
        &self.claim_id
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Terminal status recorded against a task key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub state: TaskState,
    pub recorded_at: DateTime<Utc>,
    pub reported_by: Option<String>,
}

/// The state agents see for a task
///
/// A recorded terminal status wins; otherwise the task is claimed exactly
/// when it has a live lease. Registries drop the status when a new lease is
/// acquired, so a terminal status alongside a live lease only happens while
/// the escalating agent still holds it.
pub fn observed_state(status: Option<&StatusRecord>, live_lease: Option<&Lease>) -> TaskState {
    match (status, live_lease) {
        (Some(record), _) if record.state.is_terminal() => record.state,
        (_, Some(_)) => TaskState::Claimed,
        (_, None) => TaskState::Open,
    }
}

/// Reasons a lease operation is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaseError {
    #[error("Task already claimed by {holder} at {claimed_at}")]
    Conflict {
        holder: String,
        claimed_at: DateTime<Utc>,
    },

    #[error("Task has no live claim")]
    NotClaimed,

    #[error("Task is claimed by {holder}")]
    NotHolder { holder: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_736_848_800 + secs, 0).unwrap()
    }

    #[test]
    fn claim_id_embeds_key_agent_and_time() {
        let lease = Lease::new(TaskKey::new(2, 23), "agent-a", at(0), Duration::minutes(30));
        assert_eq!(lease.claim_id(), "2-23-agent-a-1736848800");
    }

    #[test]
    fn liveness_boundary_is_exclusive() {
        let ttl = Duration::seconds(1800);
        let lease = Lease::new(TaskKey::new(1, 15), "agent", at(0), ttl);

        assert!(lease.is_live_at(at(0)));
        assert!(lease.is_live_at(at(1799)));
        assert!(!lease.is_live_at(at(1800)));
        assert_eq!(lease.expires_at(), at(1800));
    }

    #[test]
    fn observed_state_prefers_recorded_status() {
        let lease = Lease::new(TaskKey::new(3, 8), "agent", at(0), Duration::minutes(30));
        let escalated = StatusRecord {
            state: TaskState::Escalated,
            recorded_at: at(10),
            reported_by: None,
        };

        assert_eq!(observed_state(None, None), TaskState::Open);
        assert_eq!(observed_state(None, Some(&lease)), TaskState::Claimed);
        assert_eq!(observed_state(Some(&escalated), Some(&lease)), TaskState::Escalated);
        assert_eq!(observed_state(Some(&escalated), None), TaskState::Escalated);

        let open = StatusRecord {
            state: TaskState::Open,
            ..escalated
        };
        assert_eq!(observed_state(Some(&open), Some(&lease)), TaskState::Claimed);
        assert_eq!(observed_state(Some(&open), None), TaskState::Open);
    }

    #[test]
    fn holder_match() {
        let lease = Lease::new(TaskKey::new(1, 15), "agent-a", at(0), Duration::minutes(1));
        assert!(lease.is_held_by("agent-a"));
        assert!(!lease.is_held_by("agent-b"));
        assert_eq!(lease.holder(), "agent-a");
        assert_eq!(lease.ttl(), Duration::minutes(1));
    }
}
