use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{activity, health, projects, tasks};
use super::state::AppState;

/// Build the HTTP router with tracing and open CORS
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Catalog
        .route("/api/bzzz/active-repos", get(projects::active_repos))
        .route("/api/bzzz/projects/:id/tasks", get(tasks::list_tasks))
        // Claim lifecycle
        .route("/api/bzzz/projects/:id/claim", post(tasks::claim_task))
        .route("/api/bzzz/projects/:id/release", post(tasks::release_task))
        .route("/api/bzzz/projects/:id/status", put(tasks::update_status))
        // Activity
        .route("/api/bzzz/coordination-log", post(activity::coordination_log))
        .route("/api/bzzz/projects/:id/submit-work", post(activity::submit_work))
        .route("/api/bzzz/projects/:id/create-pr", post(activity::create_pr))
        .route(
            "/api/bzzz/projects/:id/coordination-discussion",
            post(activity::coordination_discussion),
        )
        .route("/api/bzzz/projects/:id/log-prompt", post(activity::log_prompt))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}
