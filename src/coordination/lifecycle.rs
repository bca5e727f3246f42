use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::errors::{CoordinationError, CoordinationResult};
use super::types::{ClaimReceipt, CompletionPolicy, LifecycleSettings, StatusOutcome, StatusUpdate};
use crate::domain::activity::{ActivityRecord, LifecycleEntry};
use crate::domain::claim::{observed_state, Lease, StatusRecord};
use crate::domain::repositories::{ActivitySink, ClaimRegistry};
use crate::domain::task::{AgentId, LifecycleEvent, TaskKey, TaskState, TaskStatus};

/// Applies claims, releases and status reports to the claim registry
///
/// Every operation either completes or fails immediately; contention is
/// reported back to the caller, never queued. Lifecycle events are
/// forwarded to the activity sink on a best-effort basis.
pub struct LifecycleController {
    registry: Arc<dyn ClaimRegistry>,
    sink: Arc<dyn ActivitySink>,
    clock: Arc<dyn Clock + Send + Sync>,
    settings: LifecycleSettings,
}

impl LifecycleController {
    pub fn new(
        registry: Arc<dyn ClaimRegistry>,
        sink: Arc<dyn ActivitySink>,
        clock: Arc<dyn Clock + Send + Sync>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            registry,
            sink,
            clock,
            settings,
        }
    }

    /// Claim a task for an agent
    ///
    /// The task does not have to exist in the catalog; claims are keyed by
    /// `(project_id, task_number)` alone.
    ///
    /// # Returns
    /// * `Ok(ClaimReceipt)` - The agent now holds the lease
    /// * `Err(MissingField)` - Task number is zero or the agent id is blank
    /// * `Err(AlreadyClaimed)` - Another live lease exists; retry later
    pub async fn claim(
        &self,
        project_id: u64,
        task_number: u64,
        agent_id: &str,
    ) -> CoordinationResult<ClaimReceipt> {
        let key = require_key(project_id, task_number)?;
        let agent = AgentId::new(agent_id).ok_or(CoordinationError::MissingField("agent_id"))?;
        let now = self.clock.utc();

        let lease = Lease::new(key, agent.as_str(), now, self.settings.claim_ttl);
        let lease = self.registry.try_acquire(key, lease).await.map_err(|error| {
            warn!(task = %key, agent = %agent, %error, "Claim rejected");
            CoordinationError::from(error)
        })?;

        info!(task = %key, agent = %agent, claim_id = lease.claim_id(), "Task claimed");
        self.emit(
            LifecycleEvent::Claimed {
                key,
                agent_id: agent.to_string(),
                claim_id: lease.claim_id().to_string(),
                expires_at: lease.expires_at(),
            },
            now,
        )
        .await;

        Ok(ClaimReceipt {
            claim_id: lease.claim_id().to_string(),
            holder: lease.holder().to_string(),
            acquired_at: lease.acquired_at(),
            expires_at: lease.expires_at(),
        })
    }

    /// Give a claimed task back before its lease expires
    ///
    /// Only the current holder may release.
    pub async fn release(
        &self,
        project_id: u64,
        task_number: u64,
        agent_id: &str,
    ) -> CoordinationResult<()> {
        let key = require_key(project_id, task_number)?;
        let agent = AgentId::new(agent_id).ok_or(CoordinationError::MissingField("agent_id"))?;
        let now = self.clock.utc();

        self.registry.release(key, agent.as_str(), now).await?;

        info!(task = %key, agent = %agent, "Task released");
        self.emit(
            LifecycleEvent::Released {
                key,
                agent_id: agent.to_string(),
            },
            now,
        )
        .await;
        Ok(())
    }

    /// Record a status reported by an agent
    ///
    /// - `completed` removes the lease (subject to the completion policy)
    ///   and records the task as completed
    /// - `escalated` leaves the lease alone and records the escalation
    /// - any other status is only logged
    pub async fn set_status(&self, update: StatusUpdate) -> CoordinationResult<StatusOutcome> {
        let key = require_key(update.project_id, update.task_number)?;
        if update.status.trim().is_empty() {
            return Err(CoordinationError::MissingField("status"));
        }
        let status = TaskStatus::parse(&update.status);
        let reporter = update.agent_id.as_deref().and_then(AgentId::new);
        let reported_by = reporter.as_ref().map(AgentId::to_string);
        let now = self.clock.utc();

        match status {
            TaskStatus::Completed => {
                let released = self.release_for_completion(key, reporter.as_ref(), now).await?;
                let released_holder = released.map(|lease| lease.holder().to_string());
                self.record_terminal(key, TaskState::Completed, released_holder.is_some(), reported_by.clone(), now)
                    .await;

                info!(task = %key, holder = ?released_holder, "Task completed");
                self.emit(
                    LifecycleEvent::Completed {
                        key,
                        reported_by,
                        released_holder: released_holder.clone(),
                    },
                    now,
                )
                .await;

                Ok(StatusOutcome {
                    recorded_state: Some(TaskState::Completed),
                    released_holder,
                })
            }
            TaskStatus::Escalated => {
                let claimed = self.registry.live_lease(key, now).await.is_some();
                self.record_terminal(key, TaskState::Escalated, claimed, reported_by.clone(), now)
                    .await;

                warn!(task = %key, metadata = %update.metadata, "Task escalated");
                self.emit(
                    LifecycleEvent::Escalated {
                        key,
                        reported_by,
                        metadata: update.metadata,
                    },
                    now,
                )
                .await;

                Ok(StatusOutcome {
                    recorded_state: Some(TaskState::Escalated),
                    released_holder: None,
                })
            }
            TaskStatus::Other(status) => {
                info!(task = %key, %status, "Task status reported");
                self.emit(
                    LifecycleEvent::StatusReported {
                        key,
                        status,
                        reported_by,
                    },
                    now,
                )
                .await;

                Ok(StatusOutcome {
                    recorded_state: None,
                    released_holder: None,
                })
            }
        }
    }

    /// Remove the lease for a completion, honouring the completion policy
    ///
    /// Returns the removed lease only when it was still live.
    async fn release_for_completion(
        &self,
        key: TaskKey,
        reporter: Option<&AgentId>,
        now: DateTime<Utc>,
    ) -> CoordinationResult<Option<Lease>> {
        match (self.settings.completion_policy, reporter) {
            (CompletionPolicy::AnyAgent, _) => Ok(self
                .registry
                .remove(key)
                .await
                .filter(|lease| lease.is_live_at(now))),
            (CompletionPolicy::HolderOnly, Some(agent)) => {
                Ok(self.registry.remove_if_held(key, agent.as_str(), now).await?)
            }
            (CompletionPolicy::HolderOnly, None) => {
                if self.registry.live_lease(key, now).await.is_some() {
                    Err(CoordinationError::MissingField("agent_id"))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Record a terminal state, noting when it skips the claim lifecycle
    async fn record_terminal(
        &self,
        key: TaskKey,
        next: TaskState,
        was_claimed: bool,
        reported_by: Option<String>,
        now: DateTime<Utc>,
    ) {
        let previous = self.registry.status(key).await;
        let from = if was_claimed && previous.is_none() {
            TaskState::Claimed
        } else {
            observed_state(previous.as_ref(), None)
        };
        if !from.can_transition_to(next) {
            debug!(task = %key, %from, to = %next, "Status accepted outside the claim lifecycle");
        }

        self.registry
            .record_status(
                key,
                StatusRecord {
                    state: next,
                    recorded_at: now,
                    reported_by,
                },
            )
            .await;
    }

    async fn emit(&self, event: LifecycleEvent, now: DateTime<Utc>) {
        let record = ActivityRecord::Lifecycle(LifecycleEntry::from_event(&event, now));
        if let Err(error) = self.sink.record(&record).await {
            warn!(event = event.name(), task = %event.key(), %error, "Failed to record lifecycle activity");
        }
    }
}

fn require_key(project_id: u64, task_number: u64) -> CoordinationResult<TaskKey> {
    if task_number == 0 {
        return Err(CoordinationError::MissingField("task_number"));
    }
    Ok(TaskKey::new(project_id, task_number))
}
