use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::coordination::{StatusUpdate, TaskView};

/// Request body for claiming or releasing a task
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub task_number: Option<u64>,
    pub agent_id: Option<String>,
}

/// Response from a successful claim
#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub success: bool,
    pub claim_id: String,
    pub expires_at: String,
}

/// Request body for a status update
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub task_number: Option<u64>,
    pub status: Option<String>,
    pub agent_id: Option<String>,
    #[serde(default, alias = "results")]
    pub metadata: Option<Value>,
}

/// Plain acknowledgement
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// List tasks for a project with claim state overlaid
///
/// GET /api/bzzz/projects/:id/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
) -> Json<Vec<TaskView>> {
    Json(state.views.render_tasks(project_id).await)
}

/// Claim a task
///
/// POST /api/bzzz/projects/:id/claim
pub async fn claim_task(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    payload: Result<Json<ClaimRequest>, JsonRejection>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let Json(req) = payload?;

    let receipt = state
        .lifecycle
        .claim(
            project_id,
            req.task_number.unwrap_or_default(),
            req.agent_id.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(ClaimResponse {
        success: true,
        claim_id: receipt.claim_id,
        expires_at: receipt.expires_at.to_rfc3339(),
    }))
}

/// Release a claimed task before its lease expires
///
/// POST /api/bzzz/projects/:id/release
pub async fn release_task(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    payload: Result<Json<ClaimRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = payload?;

    state
        .lifecycle
        .release(
            project_id,
            req.task_number.unwrap_or_default(),
            req.agent_id.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Report task status
///
/// PUT /api/bzzz/projects/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = payload?;

    state
        .lifecycle
        .set_status(StatusUpdate {
            project_id,
            task_number: req.task_number.unwrap_or_default(),
            status: req.status.unwrap_or_default(),
            agent_id: req.agent_id,
            metadata: req.metadata.unwrap_or_else(|| Value::Object(Default::default())),
        })
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}
