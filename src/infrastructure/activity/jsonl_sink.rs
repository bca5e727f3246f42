use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::domain::activity::ActivityRecord;
use crate::domain::repositories::{ActivitySink, SinkError};

/// File-backed activity sink
///
/// Layout under the root directory:
/// ```text
/// <root>/<category>/<log_prefix>_YYYYMMDD.jsonl   one line per record
/// <root>/<category>/<stem>.json                   pretty copy, some kinds only
/// ```
///
/// Appends to one log file are serialized, so concurrent records of any size
/// never interleave within a line.
#[derive(Debug, Clone)]
pub struct JsonlActivitySink {
    root: PathBuf,
    append_locks: Arc<Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>>,
}

impl JsonlActivitySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            append_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Path of the daily log the record is appended to
    pub fn log_path(&self, record: &ActivityRecord) -> PathBuf {
        let category = record.category();
        self.root.join(category.directory()).join(format!(
            "{}_{}.jsonl",
            category.log_prefix(),
            record.recorded_at().format("%Y%m%d")
        ))
    }

    fn append_lock(&self, path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.append_locks.lock();
        // Drop locks for logs nobody is appending to
        locks.retain(|held, lock| held == path || Arc::strong_count(lock) > 1);
        locks.entry(path.to_path_buf()).or_default().clone()
    }

    async fn append_line(&self, path: PathBuf, line: &[u8]) -> Result<(), SinkError> {
        let lock = self.append_lock(&path);
        let _guard = lock.lock().await;

        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        log.write_all(line).await?;
        log.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl ActivitySink for JsonlActivitySink {
    async fn record(&self, record: &ActivityRecord) -> Result<(), SinkError> {
        let dir = self.root.join(record.category().directory());
        fs::create_dir_all(&dir).await?;

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.append_line(self.log_path(record), &line).await?;

        if let Some(stem) = record.standalone_stem() {
            let path = dir.join(format!("{}.json", stem));
            fs::write(&path, serde_json::to_vec_pretty(record)?).await?;
            tracing::debug!(path = %path.display(), "Saved activity record");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::{CoordinationEntry, WorkSubmission};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn work(agent_id: &str) -> ActivityRecord {
        ActivityRecord::Work(WorkSubmission {
            project_id: 2,
            task_number: 23,
            agent_id: agent_id.to_string(),
            work_type: "code".to_string(),
            content: "fn main() {}".to_string(),
            files: BTreeMap::from([("src/main.rs".to_string(), "fn main() {}".to_string())]),
            commit_message: "Add entry point".to_string(),
            description: String::new(),
            submitted_at: Utc.with_ymd_and_hms(2025, 1, 14, 9, 30, 0).unwrap(),
        })
    }

    #[tokio::test]
    async fn appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlActivitySink::new(dir.path());

        sink.record(&work("agent-a")).await.unwrap();
        sink.record(&work("agent-b")).await.unwrap();

        let log = dir.path().join("agent_work").join("agent_work_log_20250114.jsonl");
        let content = std::fs::read_to_string(&log).unwrap();
        let lines: Vec<Value> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "work");
        assert_eq!(lines[0]["agent_id"], "agent-a");
        assert_eq!(lines[1]["agent_id"], "agent-b");
        assert_eq!(sink.log_path(&work("x")), log);
    }

    #[tokio::test]
    async fn work_records_get_standalone_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlActivitySink::new(dir.path());

        sink.record(&work("node/agent")).await.unwrap();

        let file = dir
            .path()
            .join("agent_work")
            .join("work_p2_t23_node_agent_093000.json");
        let value: Value = serde_json::from_str(&std::fs::read_to_string(file).unwrap()).unwrap();
        assert_eq!(value["files"]["src/main.rs"], "fn main() {}");
    }

    #[tokio::test]
    async fn plain_coordination_entries_only_hit_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlActivitySink::new(dir.path());
        let record = ActivityRecord::Coordination(CoordinationEntry::new(
            "dependency_detected",
            json!({ "session_id": "s-9" }),
            Utc.with_ymd_and_hms(2025, 1, 14, 9, 30, 0).unwrap(),
        ));

        sink.record(&record).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("coordination_work"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["coordination_work_20250114.jsonl".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_large_records_keep_whole_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlActivitySink::new(dir.path());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let sink = sink.clone();
                tokio::spawn(async move {
                    let mut record = work(&format!("agent-{}", i));
                    if let ActivityRecord::Work(work) = &mut record {
                        work.content = "x".repeat(256 * 1024);
                    }
                    sink.record(&record).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let log = dir.path().join("agent_work").join("agent_work_log_20250114.jsonl");
        let content = std::fs::read_to_string(&log).unwrap();
        let mut agents: Vec<String> = content
            .lines()
            .map(|line| {
                let value: Value = serde_json::from_str(line).unwrap();
                value["agent_id"].as_str().unwrap().to_string()
            })
            .collect();
        agents.sort();
        agents.dedup();
        assert_eq!(agents.len(), 16);
        assert_eq!(content.lines().count(), 16);
    }

    #[tokio::test]
    async fn unwritable_root_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let sink = JsonlActivitySink::new(&blocker);

        let result = sink.record(&work("agent")).await;
        assert!(matches!(result, Err(SinkError::Io(_))));
    }
}
