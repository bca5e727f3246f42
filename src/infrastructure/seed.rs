//! Built-in catalog of mock projects and tasks
//!
//! Four repositories with cross-repository dependencies, shaped so agents
//! have something to negotiate over: the bzzz API contract (#23) blocks
//! work in three other places.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::project::Project;
use crate::domain::repositories::{CatalogError, TaskCatalog};
use crate::domain::task::{Dependency, Task};
use crate::domain::DomainError;
use crate::infrastructure::repositories::InMemoryTaskCatalog;

const OWNER: &str = "mock-org";

struct SeedTask {
    project_id: u64,
    number: u64,
    title: &'static str,
    description: &'static str,
    labels: &'static [&'static str],
    task_type: &'static str,
    created: (u32, u32),
    updated: (u32, u32),
    dependencies: &'static [(&'static str, u64, &'static str)],
}

const SEED_TASKS: &[SeedTask] = &[
    SeedTask {
        project_id: 1,
        number: 15,
        title: "Add WebSocket support for real-time coordination",
        description: "Implement WebSocket endpoints for real-time agent coordination messages",
        labels: &["bzzz-task", "feature", "realtime", "coordination"],
        task_type: "feature",
        created: (10, 0),
        updated: (10, 30),
        dependencies: &[("bzzz", 23, "api_contract")],
    },
    SeedTask {
        project_id: 1,
        number: 16,
        title: "Implement agent authentication system",
        description: "Add secure JWT-based authentication for bzzz agents accessing Hive APIs",
        labels: &["bzzz-task", "security", "auth", "high-priority"],
        task_type: "security",
        created: (9, 30),
        updated: (10, 45),
        dependencies: &[],
    },
    SeedTask {
        project_id: 1,
        number: 17,
        title: "Create coordination metrics dashboard",
        description: "Build dashboard showing cross-repository coordination statistics",
        labels: &["bzzz-task", "dashboard", "metrics", "ui"],
        task_type: "feature",
        created: (11, 0),
        updated: (11, 15),
        dependencies: &[("bzzz", 24, "api_contract")],
    },
    SeedTask {
        project_id: 2,
        number: 23,
        title: "Define coordination API contract",
        description: "Standardize API contract for cross-repository coordination messaging",
        labels: &["bzzz-task", "api", "coordination", "blocker"],
        task_type: "api_design",
        created: (9, 0),
        updated: (10, 0),
        dependencies: &[],
    },
    SeedTask {
        project_id: 2,
        number: 24,
        title: "Implement dependency detection algorithm",
        description: "Auto-detect task dependencies across repositories using graph analysis",
        labels: &["bzzz-task", "algorithm", "coordination", "complex"],
        task_type: "feature",
        created: (10, 15),
        updated: (10, 30),
        dependencies: &[("bzzz", 23, "api_contract")],
    },
    SeedTask {
        project_id: 2,
        number: 25,
        title: "Add consensus algorithm for coordination",
        description: "Implement distributed consensus for multi-agent task coordination",
        labels: &["bzzz-task", "consensus", "distributed-systems", "hard"],
        task_type: "feature",
        created: (11, 30),
        updated: (11, 45),
        dependencies: &[],
    },
    SeedTask {
        project_id: 3,
        number: 8,
        title: "Add support for bzzz coordination",
        description: "Integrate with bzzz P2P coordination system for distributed AI development",
        labels: &["bzzz-task", "integration", "p2p", "ai"],
        task_type: "integration",
        created: (10, 45),
        updated: (11, 0),
        dependencies: &[("bzzz", 23, "api_contract"), ("hive", 16, "security")],
    },
    SeedTask {
        project_id: 3,
        number: 9,
        title: "Implement AI model coordination",
        description: "Enable coordination between AI models across different development environments",
        labels: &["bzzz-task", "ai-coordination", "models", "complex"],
        task_type: "feature",
        created: (11, 15),
        updated: (11, 30),
        dependencies: &[("distributed-ai-dev", 8, "integration")],
    },
    SeedTask {
        project_id: 4,
        number: 12,
        title: "Automate bzzz deployment across cluster",
        description: "Create automated deployment scripts for bzzz agents on all cluster nodes",
        labels: &["bzzz-task", "deployment", "automation", "devops"],
        task_type: "infrastructure",
        created: (12, 0),
        updated: (12, 15),
        dependencies: &[("hive", 16, "security")],
    },
];

/// Errors building the seed catalog
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// The four mock repositories agents coordinate across
pub fn seed_projects() -> Result<Vec<Project>, DomainError> {
    Ok(vec![
        Project::new(1, "hive-coordination-platform", OWNER, "hive")?
            .with_git_url("https://github.com/mock/hive"),
        Project::new(2, "bzzz-p2p-system", OWNER, "bzzz")?
            .with_git_url("https://github.com/mock/bzzz"),
        Project::new(3, "distributed-ai-development", OWNER, "distributed-ai-dev")?
            .with_git_url("https://github.com/mock/distributed-ai-dev"),
        Project::new(4, "infrastructure-automation", OWNER, "infra-automation")?
            .with_git_url("https://github.com/mock/infra-automation"),
    ])
}

fn seed_time(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 14, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

/// The seed tasks, each linked to its project's issue URL
pub fn seed_tasks(projects: &[Project]) -> Result<Vec<Task>, DomainError> {
    SEED_TASKS
        .iter()
        .map(|seed| {
            let repository = projects
                .iter()
                .find(|project| project.id == seed.project_id)
                .map(|project| project.git_url.as_str())
                .unwrap_or("https://github.com/mock/repo");
            let dependencies = seed
                .dependencies
                .iter()
                .map(|(repo, number, kind)| Dependency::new(*repo, *number, *kind))
                .collect();

            Ok(Task::new(
                seed.project_id,
                seed.number,
                seed.title,
                seed_time(seed.created.0, seed.created.1),
            )?
            .with_description(seed.description)
            .with_labels(seed.labels.iter().copied())
            .with_task_type(seed.task_type)
            .with_html_url(format!("{}/issues/{}", repository, seed.number))
            .with_dependencies(dependencies)
            .with_updated_at(seed_time(seed.updated.0, seed.updated.1)))
        })
        .collect()
}

/// Builds an in-memory catalog holding the seed projects and tasks
pub async fn seeded_catalog() -> Result<InMemoryTaskCatalog, SeedError> {
    let projects = seed_projects()?;
    let tasks = seed_tasks(&projects)?;
    let catalog = InMemoryTaskCatalog::new(projects);
    for task in tasks {
        catalog.append_task(task).await?;
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::TaskKey;

    #[tokio::test]
    async fn seeded_catalog_has_four_projects_and_nine_tasks() {
        let catalog = seeded_catalog().await.unwrap();
        let projects = catalog.list_projects().await;

        assert_eq!(projects.len(), 4);
        let mut total = 0;
        for project in &projects {
            total += catalog.list_tasks(project.id).await.len();
        }
        assert_eq!(total, 9);
    }

    #[tokio::test]
    async fn seed_task_fields_match_issue_tracker() {
        let catalog = seeded_catalog().await.unwrap();
        let task = catalog.find_task(TaskKey::new(3, 8)).await.unwrap();

        assert_eq!(task.title(), "Add support for bzzz coordination");
        assert_eq!(task.task_type(), "integration");
        assert_eq!(
            task.html_url(),
            Some("https://github.com/mock/distributed-ai-dev/issues/8")
        );
        assert_eq!(
            task.dependencies(),
            [
                Dependency::new("bzzz", 23, "api_contract"),
                Dependency::new("hive", 16, "security"),
            ]
        );
        assert_eq!(task.created_at(), seed_time(10, 45));
        assert_eq!(task.updated_at(), seed_time(11, 0));
    }

    #[test]
    fn every_seed_dependency_targets_a_seed_repository() {
        let projects = seed_projects().unwrap();
        let tasks = seed_tasks(&projects).unwrap();

        for task in &tasks {
            for dependency in task.dependencies() {
                let target = projects
                    .iter()
                    .find(|project| project.repository == dependency.repository)
                    .expect("dependency repository is seeded");
                assert!(tasks
                    .iter()
                    .any(|t| t.project_id() == target.id && t.number() == dependency.task_number));
            }
        }
    }
}
