use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::claim::{Lease, LeaseError, StatusRecord};
use crate::domain::task::TaskKey;

/// Repository trait for task leases and recorded task statuses
///
/// Every method is atomic with respect to the others: implementations must
/// make the check-and-set in `try_acquire` a single critical section so two
/// racing claims on one key can never both succeed.
///
/// Expiry is lazy. Any method that looks at a lease treats one whose TTL has
/// elapsed at `now` as absent and drops it.
#[async_trait]
pub trait ClaimRegistry: Send + Sync {
    /// Store `lease` for `key` unless a live lease already exists at the
    /// lease's acquisition time
    ///
    /// A successful acquire also drops any status recorded for `key` in the
    /// same critical section, so a re-claimed task reads as claimed.
    ///
    /// # Returns
    /// * `Ok(Lease)` - The stored lease
    /// * `Err(LeaseError::Conflict)` - The current holder and claim time
    async fn try_acquire(&self, key: TaskKey, lease: Lease) -> Result<Lease, LeaseError>;

    /// The live lease on `key`, evicting it first if it has expired
    async fn live_lease(&self, key: TaskKey, now: DateTime<Utc>) -> Option<Lease>;

    /// Remove the live lease on `key` if `holder` owns it
    async fn release(
        &self,
        key: TaskKey,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<Lease, LeaseError>;

    /// Remove whatever lease `key` has, live or not
    async fn remove(&self, key: TaskKey) -> Option<Lease>;

    /// Remove the lease on `key` unless a live lease is held by someone else
    ///
    /// # Returns
    /// * `Ok(Some(lease))` - The live lease held by `holder`, now removed
    /// * `Ok(None)` - There was no live lease
    /// * `Err(LeaseError::NotHolder)` - Another agent holds the live lease
    async fn remove_if_held(
        &self,
        key: TaskKey,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Lease>, LeaseError>;

    async fn record_status(&self, key: TaskKey, record: StatusRecord);

    async fn status(&self, key: TaskKey) -> Option<StatusRecord>;

    /// Drop every expired lease and return how many live ones remain
    async fn purge_expired(&self, now: DateTime<Utc>) -> usize;
}
