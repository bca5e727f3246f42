use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::domain::claim::{Lease, LeaseError, StatusRecord};
use crate::domain::repositories::ClaimRegistry;
use crate::domain::task::TaskKey;

/// In-memory implementation of ClaimRegistry
///
/// A single write lock serializes every mutation, which makes each
/// check-and-set atomic across all keys. The lock is never held across an
/// await point.
#[derive(Debug, Default)]
pub struct InMemoryClaimRegistry {
    state: RwLock<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    leases: HashMap<TaskKey, Lease>,
    statuses: HashMap<TaskKey, StatusRecord>,
}

impl RegistryState {
    /// Returns the live lease on `key`, dropping it if it has expired
    fn live(&mut self, key: TaskKey, now: DateTime<Utc>) -> Option<&Lease> {
        let expired = self
            .leases
            .get(&key)
            .is_some_and(|lease| !lease.is_live_at(now));
        if expired {
            if let Some(stale) = self.leases.remove(&key) {
                tracing::debug!(task = %key, holder = stale.holder(), "Evicted expired claim");
            }
        }
        self.leases.get(&key)
    }

    /// Fails with `NotHolder` when someone other than `holder` has a live lease
    fn check_holder(
        &mut self,
        key: TaskKey,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, LeaseError> {
        match self.live(key, now) {
            None => Ok(false),
            Some(lease) if !lease.is_held_by(holder) => Err(LeaseError::NotHolder {
                holder: lease.holder().to_string(),
            }),
            Some(_) => Ok(true),
        }
    }
}

impl InMemoryClaimRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClaimRegistry for InMemoryClaimRegistry {
    async fn try_acquire(&self, key: TaskKey, lease: Lease) -> Result<Lease, LeaseError> {
        let mut state = self.state.write();
        if let Some(existing) = state.live(key, lease.acquired_at()) {
            return Err(LeaseError::Conflict {
                holder: existing.holder().to_string(),
                claimed_at: existing.acquired_at(),
            });
        }

        // A new claim supersedes any recorded terminal status
        if let Some(previous) = state.statuses.remove(&key) {
            tracing::debug!(task = %key, state = %previous.state, "Cleared status on re-claim");
        }
        state.leases.insert(key, lease.clone());
        Ok(lease)
    }

    async fn live_lease(&self, key: TaskKey, now: DateTime<Utc>) -> Option<Lease> {
        {
            let state = self.state.read();
            match state.leases.get(&key) {
                None => return None,
                Some(lease) if lease.is_live_at(now) => return Some(lease.clone()),
                Some(_) => {}
            }
        }
        // Expired: take the write lock to evict, re-checking under it
        self.state.write().live(key, now).cloned()
    }

    async fn release(
        &self,
        key: TaskKey,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<Lease, LeaseError> {
        let mut state = self.state.write();
        if !state.check_holder(key, holder, now)? {
            return Err(LeaseError::NotClaimed);
        }
        state.leases.remove(&key).ok_or(LeaseError::NotClaimed)
    }

    async fn remove(&self, key: TaskKey) -> Option<Lease> {
        self.state.write().leases.remove(&key)
    }

    async fn remove_if_held(
        &self,
        key: TaskKey,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Lease>, LeaseError> {
        let mut state = self.state.write();
        if !state.check_holder(key, holder, now)? {
            return Ok(None);
        }
        Ok(state.leases.remove(&key))
    }

    async fn record_status(&self, key: TaskKey, record: StatusRecord) {
        self.state.write().statuses.insert(key, record);
    }

    async fn status(&self, key: TaskKey) -> Option<StatusRecord> {
        self.state.read().statuses.get(&key).cloned()
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.state.write();
        state.leases.retain(|_, lease| lease.is_live_at(now));
        state.leases.len()
    }
}
