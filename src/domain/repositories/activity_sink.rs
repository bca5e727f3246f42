use async_trait::async_trait;
use thiserror::Error;

use crate::domain::activity::ActivityRecord;

/// Errors a sink can hit while persisting a record
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Activity log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Activity record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Write-only destination for coordination activity
///
/// Writes are best effort. Callers log a failed write and carry on; a sink
/// error never fails a claim, a status update, or a logging request.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn record(&self, record: &ActivityRecord) -> Result<(), SinkError>;
}
