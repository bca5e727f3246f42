use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

use super::types::{DependencyView, TaskView};
use crate::domain::claim::observed_state;
use crate::domain::repositories::{ClaimRegistry, TaskCatalog};
use crate::domain::task::{Dependency, Task, TaskKey};

/// Builds the task list agents poll, overlaying live claims on catalog tasks
pub struct TaskViewBuilder {
    catalog: Arc<dyn TaskCatalog>,
    registry: Arc<dyn ClaimRegistry>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl TaskViewBuilder {
    pub fn new(
        catalog: Arc<dyn TaskCatalog>,
        registry: Arc<dyn ClaimRegistry>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            catalog,
            registry,
            clock,
        }
    }

    /// Render every task of a project; an unknown project renders nothing
    pub async fn render_tasks(&self, project_id: u64) -> Vec<TaskView> {
        let tasks = self.catalog.list_tasks(project_id).await;
        let now = self.clock.utc();

        let mut views = Vec::with_capacity(tasks.len());
        for task in &tasks {
            views.push(self.render(task, now).await);
        }

        debug!(project_id, tasks = views.len(), "Rendered task views");
        views
    }

    async fn render(&self, task: &Task, now: DateTime<Utc>) -> TaskView {
        let key = task.key();
        let lease = self.registry.live_lease(key, now).await;
        let status = self.registry.status(key).await;

        let mut dependencies = Vec::with_capacity(task.dependencies().len());
        for dependency in task.dependencies() {
            dependencies.push(self.resolve(dependency).await);
        }

        TaskView {
            number: task.number(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            state: observed_state(status.as_ref(), lease.as_ref()),
            labels: task.labels().to_vec(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
            html_url: task.html_url().map(str::to_string),
            is_claimed: lease.is_some(),
            assignees: lease
                .iter()
                .map(|lease| lease.holder().to_string())
                .collect(),
            task_type: task.task_type().to_string(),
            dependencies,
            claim_expires_at: lease.as_ref().map(|lease| lease.expires_at()),
        }
    }

    async fn resolve(&self, dependency: &Dependency) -> DependencyView {
        let Some(project) = self
            .catalog
            .find_project_by_repository(&dependency.repository)
            .await
        else {
            return DependencyView::unknown(dependency);
        };

        let target = TaskKey::new(project.id, dependency.task_number);
        match self.catalog.find_task(target).await {
            Some(_) => DependencyView::resolved(dependency, project.id),
            None => DependencyView::unknown(dependency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::types::DependencyStatus;
    use crate::domain::claim::{Lease, StatusRecord};
    use crate::domain::task::TaskState;
    use crate::infrastructure::clock::ManualClock;
    use crate::infrastructure::repositories::{InMemoryClaimRegistry, InMemoryTaskCatalog};
    use crate::infrastructure::seed::{seed_projects, seeded_catalog};
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 14, 12, 0, 0).unwrap()
    }

    async fn setup() -> (TaskViewBuilder, Arc<InMemoryClaimRegistry>, Arc<ManualClock>) {
        let catalog = Arc::new(seeded_catalog().await.unwrap());
        let registry = Arc::new(InMemoryClaimRegistry::new());
        let clock = Arc::new(ManualClock::new(start()));
        let builder = TaskViewBuilder::new(catalog, registry.clone(), clock.clone());
        (builder, registry, clock)
    }

    fn find(views: &[TaskView], number: u64) -> &TaskView {
        views
            .iter()
            .find(|view| view.number == number)
            .unwrap_or_else(|| panic!("task {} missing", number))
    }

    #[tokio::test]
    async fn unclaimed_tasks_render_open() {
        let (builder, _, _) = setup().await;
        let views = builder.render_tasks(2).await;

        assert!(!views.is_empty());
        for view in &views {
            assert_eq!(view.state, TaskState::Open);
            assert!(!view.is_claimed);
            assert!(view.assignees.is_empty());
            assert_eq!(view.claim_expires_at, None);
        }
    }

    #[tokio::test]
    async fn live_lease_overlays_claim() {
        let (builder, registry, clock) = setup().await;
        let key = TaskKey::new(2, 23);
        registry
            .try_acquire(key, Lease::new(key, "agent-a", start(), Duration::minutes(30)))
            .await
            .unwrap();
        clock.advance(Duration::minutes(5));

        let views = builder.render_tasks(2).await;
        let view = find(&views, 23);
        assert_eq!(view.state, TaskState::Claimed);
        assert!(view.is_claimed);
        assert_eq!(view.assignees, vec!["agent-a".to_string()]);
        assert_eq!(view.claim_expires_at, Some(start() + Duration::minutes(30)));

        clock.advance(Duration::minutes(25));
        let views = builder.render_tasks(2).await;
        let view = find(&views, 23);
        assert_eq!(view.state, TaskState::Open);
        assert!(!view.is_claimed);
        assert!(registry.remove(key).await.is_none());
    }

    #[tokio::test]
    async fn recorded_status_takes_precedence() {
        let (builder, registry, _) = setup().await;
        registry
            .record_status(
                TaskKey::new(1, 16),
                StatusRecord {
                    state: TaskState::Completed,
                    recorded_at: start(),
                    reported_by: None,
                },
            )
            .await;

        let views = builder.render_tasks(1).await;
        assert_eq!(find(&views, 16).state, TaskState::Completed);
        assert!(!find(&views, 16).is_claimed);
    }

    #[tokio::test]
    async fn reclaim_after_terminal_status_renders_claimed() {
        let (builder, registry, clock) = setup().await;
        let completed = TaskKey::new(2, 23);
        let escalated = TaskKey::new(2, 24);

        for (key, state) in [
            (completed, TaskState::Completed),
            (escalated, TaskState::Escalated),
        ] {
            registry
                .try_acquire(key, Lease::new(key, "agent-a", start(), Duration::minutes(30)))
                .await
                .unwrap();
            registry
                .record_status(
                    key,
                    StatusRecord {
                        state,
                        recorded_at: start(),
                        reported_by: Some("agent-a".to_string()),
                    },
                )
                .await;
        }
        registry.remove(completed).await;

        // The escalated lease runs out, then agent-b claims both tasks
        clock.advance(Duration::minutes(30));
        for key in [completed, escalated] {
            registry
                .try_acquire(key, Lease::new(key, "agent-b", clock.utc(), Duration::minutes(30)))
                .await
                .unwrap();
        }

        let views = builder.render_tasks(2).await;
        for number in [23, 24] {
            let view = find(&views, number);
            assert_eq!(view.state, TaskState::Claimed);
            assert!(view.is_claimed);
            assert_eq!(view.assignees, vec!["agent-b".to_string()]);
        }
    }

    #[tokio::test]
    async fn dependencies_resolve_against_catalog() {
        let (builder, _, _) = setup().await;
        let views = builder.render_tasks(1).await;

        let dependency = &find(&views, 15).dependencies[0];
        assert_eq!(dependency.repository, "bzzz");
        assert_eq!(dependency.task_number, 23);
        assert_eq!(dependency.status, DependencyStatus::Resolved);
        assert_eq!(dependency.project_id, Some(2));
    }

    #[tokio::test]
    async fn dangling_dependency_is_unknown() {
        let catalog = Arc::new(InMemoryTaskCatalog::new(seed_projects().unwrap()));
        let task = Task::new(1, 99, "Orphan", start())
            .unwrap()
            .with_dependencies(vec![
                Dependency::new("bzzz", 404, "api_contract"),
                Dependency::new("no-such-repo", 1, "blocks"),
            ]);
        catalog.append_task(task).await.unwrap();

        let builder = TaskViewBuilder::new(
            catalog,
            Arc::new(InMemoryClaimRegistry::new()),
            Arc::new(ManualClock::new(start())),
        );
        let views = builder.render_tasks(1).await;

        let statuses: Vec<_> = views[0].dependencies.iter().map(|d| d.status).collect();
        assert_eq!(statuses, vec![DependencyStatus::Unknown, DependencyStatus::Unknown]);
    }

    #[tokio::test]
    async fn unknown_project_renders_empty() {
        let (builder, _, _) = setup().await;
        assert!(builder.render_tasks(999).await.is_empty());
        assert!(builder.render_tasks(999).await.is_empty());
    }
}
