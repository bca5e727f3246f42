use axum::{extract::State, Json};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::domain::project::Project;

/// Response listing the repositories agents may work on
#[derive(Debug, Serialize)]
pub struct ActiveReposResponse {
    pub repositories: Vec<Project>,
}

/// List active repositories
///
/// GET /api/bzzz/active-repos
///
/// With sampling enabled, returns a random subset of at least two
/// repositories to simulate projects coming and going.
pub async fn active_repos(State(state): State<AppState>) -> Json<ActiveReposResponse> {
    let projects: Vec<Project> = state
        .catalog
        .list_projects()
        .await
        .into_iter()
        .filter(Project::is_active)
        .collect();

    let repositories = if state.sample_active_repos && projects.len() > 2 {
        sample_projects(&projects)
    } else {
        projects
    };

    debug!(count = repositories.len(), "Active repositories requested");
    Json(ActiveReposResponse { repositories })
}

fn sample_projects(projects: &[Project]) -> Vec<Project> {
    let mut rng = rand::rng();
    let amount = rng.random_range(2..=projects.len());
    projects.choose_multiple(&mut rng, amount).cloned().collect()
}
