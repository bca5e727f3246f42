use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::activity::ActivityRecord;
use crate::domain::repositories::{ActivitySink, SinkError};

/// Keeps records in memory, for tests and sink-less simulations
#[derive(Debug, Default)]
pub struct InMemoryActivitySink {
    records: Mutex<Vec<ActivityRecord>>,
}

impl InMemoryActivitySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, oldest first
    pub fn records(&self) -> Vec<ActivityRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl ActivitySink for InMemoryActivitySink {
    async fn record(&self, record: &ActivityRecord) -> Result<(), SinkError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Discards every record
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopActivitySink;

#[async_trait]
impl ActivitySink for NoopActivitySink {
    async fn record(&self, _record: &ActivityRecord) -> Result<(), SinkError> {
        Ok(())
    }
}
