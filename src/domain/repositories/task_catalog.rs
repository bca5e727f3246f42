use async_trait::async_trait;
use thiserror::Error;

use crate::domain::project::Project;
use crate::domain::task::{Task, TaskKey};

/// Errors from appending to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Project not found: {0}")]
    UnknownProject(u64),

    #[error("Task {0} already exists")]
    DuplicateTask(TaskKey),
}

/// Repository trait for the project and task catalog
///
/// The catalog only grows. Lookups on unknown projects or tasks return empty
/// results rather than errors so polling agents stay simple.
#[async_trait]
pub trait TaskCatalog: Send + Sync {
    /// All projects, ordered by id
    async fn list_projects(&self) -> Vec<Project>;

    async fn find_project(&self, project_id: u64) -> Option<Project>;

    /// Find the project publishing the given repository name
    async fn find_project_by_repository(&self, repository: &str) -> Option<Project>;

    /// Tasks of a project in insertion order; empty for unknown projects
    async fn list_tasks(&self, project_id: u64) -> Vec<Task>;

    async fn find_task(&self, key: TaskKey) -> Option<Task>;

    /// Append a task to its project
    async fn append_task(&self, task: Task) -> Result<(), CatalogError>;
}
