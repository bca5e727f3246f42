use super::value_objects::{Dependency, TaskKey};
use crate::domain::errors::DomainError;
use chrono::{DateTime, Utc};

/// A claimable unit of work published by a project
///
/// Catalog entries are immutable values. Claim and lifecycle state live in
/// the claim registry and are overlaid when tasks are rendered, so a task
/// here never changes once it is in the catalog.
///
/// # Invariants
/// - Task number is non-zero
/// - Title cannot be empty
/// - Labels are unique, first occurrence wins
/// - `updated_at` is never before `created_at`
///
/// # Example
/// ```
/// use hive_mock_api::domain::task::{Dependency, Task};
/// use chrono::Utc;
///
/// let task = Task::new(1, 15, "Add WebSocket support", Utc::now())
///     .expect("valid task")
///     .with_labels(["bzzz-task", "feature", "bzzz-task"])
///     .with_dependencies(vec![Dependency::new("bzzz", 23, "api_contract")]);
///
/// assert_eq!(task.labels(), ["bzzz-task", "feature"]);
/// assert_eq!(task.dependencies().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    project_id: u64,
    number: u64,
    title: String,
    description: String,
    labels: Vec<String>,
    task_type: String,
    html_url: Option<String>,
    dependencies: Vec<Dependency>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task with no labels, no dependencies and type `feature`
    ///
    /// # Returns
    /// * `Ok(Task)` - New task stamped with `now` as creation and update time
    /// * `Err(DomainError)` - If the number is zero or the title is blank
    pub fn new(
        project_id: u64,
        number: u64,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        if number == 0 {
            return Err(DomainError::ZeroTaskNumber);
        }
        if title.trim().is_empty() {
            return Err(DomainError::EmptyTitle);
        }

        Ok(Self {
            project_id,
            number,
            title,
            description: String::new(),
            labels: Vec::new(),
            task_type: "feature".to_string(),
            html_url: None,
            dependencies: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets labels, dropping duplicates while keeping the given order
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        self.labels = unique;
        self
    }

    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = task_type.into();
        self
    }

    pub fn with_html_url(mut self, html_url: impl Into<String>) -> Self {
        self.html_url = Some(html_url.into());
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Overrides the update timestamp, clamped so it never precedes creation
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at.max(self.created_at);
        self
    }

    // ===== Getters =====

    pub fn key(&self) -> TaskKey {
        TaskKey::new(self.project_id, self.number)
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    pub fn html_url(&self) -> Option<&str> {
        self.html_url.as_deref()
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
