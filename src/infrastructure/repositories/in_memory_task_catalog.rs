use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::domain::project::Project;
use crate::domain::repositories::{CatalogError, TaskCatalog};
use crate::domain::task::{Task, TaskKey};

/// In-memory implementation of TaskCatalog
///
/// One lock guards projects and task lists together. Readers receive
/// cloned snapshots, so an append racing with a read is either entirely
/// visible or not visible at all.
#[derive(Debug, Default)]
pub struct InMemoryTaskCatalog {
    state: RwLock<CatalogState>,
}

#[derive(Debug, Default)]
struct CatalogState {
    projects: BTreeMap<u64, Project>,
    tasks: BTreeMap<u64, Vec<Task>>,
}

impl InMemoryTaskCatalog {
    /// Creates a catalog holding the given projects and no tasks
    pub fn new(projects: impl IntoIterator<Item = Project>) -> Self {
        let projects = projects
            .into_iter()
            .map(|project| (project.id, project))
            .collect();

        Self {
            state: RwLock::new(CatalogState {
                projects,
                tasks: BTreeMap::new(),
            }),
        }
    }
}

#[async_trait]
impl TaskCatalog for InMemoryTaskCatalog {
    async fn list_projects(&self) -> Vec<Project> {
        self.state.read().projects.values().cloned().collect()
    }

    async fn find_project(&self, project_id: u64) -> Option<Project> {
        self.state.read().projects.get(&project_id).cloned()
    }

    async fn find_project_by_repository(&self, repository: &str) -> Option<Project> {
        self.state
            .read()
            .projects
            .values()
            .find(|project| project.repository == repository)
            .cloned()
    }

    async fn list_tasks(&self, project_id: u64) -> Vec<Task> {
        self.state
            .read()
            .tasks
            .get(&project_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn find_task(&self, key: TaskKey) -> Option<Task> {
        self.state
            .read()
            .tasks
            .get(&key.project_id)?
            .iter()
            .find(|task| task.number() == key.task_number)
            .cloned()
    }

    async fn append_task(&self, task: Task) -> Result<(), CatalogError> {
        let mut state = self.state.write();
        if !state.projects.contains_key(&task.project_id()) {
            return Err(CatalogError::UnknownProject(task.project_id()));
        }

        let tasks = state.tasks.entry(task.project_id()).or_default();
        if tasks.iter().any(|existing| existing.number() == task.number()) {
            return Err(CatalogError::DuplicateTask(task.key()));
        }

        tasks.push(task);
        Ok(())
    }
}
