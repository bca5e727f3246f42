use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use mockable::Clock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::domain::activity::{
    ActivityRecord, AgentPrompt, CoordinationDiscussion, CoordinationEntry, PullRequestDraft,
    WorkSubmission,
};

const UNKNOWN_AGENT: &str = "unknown";
const UNKNOWN_REPO: &str = "unknown-repo";

/// Acknowledgement for logging endpoints
#[derive(Debug, Serialize)]
pub struct LoggedResponse {
    pub success: bool,
    /// False when the activity sink refused the record
    pub logged: bool,
}

/// Request body for free-form coordination activity
#[derive(Debug, Deserialize)]
pub struct CoordinationLogRequest {
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub details: Option<Value>,
}

/// Request body for a work submission
#[derive(Debug, Deserialize)]
pub struct SubmitWorkRequest {
    pub task_number: Option<u64>,
    pub agent_id: Option<String>,
    pub work_type: Option<String>,
    pub content: Option<String>,
    pub files: Option<BTreeMap<String, String>>,
    pub commit_message: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitWorkResponse {
    pub success: bool,
    pub logged: bool,
    pub work_id: String,
    pub message: &'static str,
}

/// Request body for a pull request
#[derive(Debug, Deserialize)]
pub struct CreatePrRequest {
    pub task_number: Option<u64>,
    pub agent_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub files_changed: Option<BTreeMap<String, String>>,
    pub branch_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatePrResponse {
    pub success: bool,
    pub logged: bool,
    pub pr_number: u32,
    pub pr_url: String,
    pub message: &'static str,
}

/// Request body for a coordination discussion
#[derive(Debug, Deserialize)]
pub struct DiscussionRequest {
    #[serde(rename = "type")]
    pub discussion_type: Option<String>,
    pub participants: Option<Vec<Value>>,
    pub messages: Option<Vec<Value>>,
    pub decisions: Option<Vec<Value>>,
    pub context: Option<Value>,
}

/// Request body for a prompt log
#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub task_number: Option<u64>,
    pub agent_id: Option<String>,
    pub prompt_type: Option<String>,
    pub prompt_content: Option<String>,
    pub context: Option<Value>,
    pub model_used: Option<String>,
}

/// Log coordination activity
///
/// POST /api/bzzz/coordination-log
pub async fn coordination_log(
    State(state): State<AppState>,
    payload: Result<Json<CoordinationLogRequest>, JsonRejection>,
) -> Result<Json<LoggedResponse>, ApiError> {
    let Json(req) = payload?;
    let entry = CoordinationEntry::new(
        req.activity_type.unwrap_or_else(|| "unknown".to_string()),
        req.details.unwrap_or_else(empty_object),
        state.clock.utc(),
    );

    info!(activity_type = %entry.activity_type, session_id = %entry.session_id, "Coordination activity");
    let logged = record(&state, ActivityRecord::Coordination(entry)).await;
    Ok(Json(LoggedResponse {
        success: true,
        logged,
    }))
}

/// Submit work produced for a task
///
/// POST /api/bzzz/projects/:id/submit-work
pub async fn submit_work(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    payload: Result<Json<SubmitWorkRequest>, JsonRejection>,
) -> Result<Json<SubmitWorkResponse>, ApiError> {
    let Json(req) = payload?;
    let now = state.clock.utc();
    let task_number = req.task_number.unwrap_or_default();

    let work = WorkSubmission {
        project_id,
        task_number,
        agent_id: req.agent_id.unwrap_or_else(|| UNKNOWN_AGENT.to_string()),
        work_type: req.work_type.unwrap_or_else(|| "code".to_string()),
        content: req.content.unwrap_or_default(),
        files: req.files.unwrap_or_default(),
        commit_message: req.commit_message.unwrap_or_default(),
        description: req.description.unwrap_or_default(),
        submitted_at: now,
    };

    info!(
        agent = %work.agent_id,
        project_id,
        task_number,
        work_type = %work.work_type,
        files = work.files.len(),
        "Work submitted"
    );
    let logged = record(&state, ActivityRecord::Work(work)).await;

    Ok(Json(SubmitWorkResponse {
        success: true,
        logged,
        work_id: format!("{}-{}-{}", project_id, task_number, now.timestamp()),
        message: "Work submitted successfully to mock repository",
    }))
}

/// Open a mock pull request
///
/// POST /api/bzzz/projects/:id/create-pr
pub async fn create_pr(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    payload: Result<Json<CreatePrRequest>, JsonRejection>,
) -> Result<Json<CreatePrResponse>, ApiError> {
    let Json(req) = payload?;
    let task_number = req.task_number.unwrap_or_default();

    let pr = PullRequestDraft {
        project_id,
        task_number,
        agent_id: req.agent_id.unwrap_or_else(|| UNKNOWN_AGENT.to_string()),
        title: req.title.unwrap_or_default(),
        description: req.description.unwrap_or_default(),
        files_changed: req.files_changed.unwrap_or_default(),
        branch_name: req
            .branch_name
            .unwrap_or_else(|| format!("bzzz-task-{}", task_number)),
        created_at: state.clock.utc(),
        status: "open".to_string(),
    };

    let repository = state
        .catalog
        .find_project(project_id)
        .await
        .map(|project| project.repository)
        .unwrap_or_else(|| UNKNOWN_REPO.to_string());
    let pr_number: u32 = rand::rng().random_range(100..=999);

    info!(agent = %pr.agent_id, project_id, title = %pr.title, pr_number, "Pull request created");
    let logged = record(&state, ActivityRecord::PullRequest(pr)).await;

    Ok(Json(CreatePrResponse {
        success: true,
        logged,
        pr_number,
        pr_url: format!("https://github.com/mock/{}/pull/{}", repository, pr_number),
        message: "Pull request created successfully in mock repository",
    }))
}

/// Log a coordination discussion between agents
///
/// POST /api/bzzz/projects/:id/coordination-discussion
pub async fn coordination_discussion(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    payload: Result<Json<DiscussionRequest>, JsonRejection>,
) -> Result<Json<LoggedResponse>, ApiError> {
    let Json(req) = payload?;
    let discussion = CoordinationDiscussion {
        project_id,
        discussion_type: req.discussion_type.unwrap_or_else(|| "general".to_string()),
        participants: req.participants.unwrap_or_default(),
        messages: req.messages.unwrap_or_default(),
        decisions: req.decisions.unwrap_or_default(),
        context: req.context.unwrap_or_else(empty_object),
        recorded_at: state.clock.utc(),
    };

    info!(
        project_id,
        discussion_type = %discussion.discussion_type,
        participants = discussion.participants.len(),
        messages = discussion.messages.len(),
        "Coordination discussion"
    );
    let logged = record(&state, ActivityRecord::Discussion(discussion)).await;
    Ok(Json(LoggedResponse {
        success: true,
        logged,
    }))
}

/// Log a prompt an agent received or generated
///
/// POST /api/bzzz/projects/:id/log-prompt
pub async fn log_prompt(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<LoggedResponse>, ApiError> {
    let Json(req) = payload?;
    let prompt = AgentPrompt {
        project_id,
        task_number: req.task_number.unwrap_or_default(),
        agent_id: req.agent_id.unwrap_or_else(|| UNKNOWN_AGENT.to_string()),
        prompt_type: req.prompt_type.unwrap_or_else(|| "task_analysis".to_string()),
        prompt_content: req.prompt_content.unwrap_or_default(),
        context: req.context.unwrap_or_else(empty_object),
        model_used: req.model_used.unwrap_or_else(|| "unknown".to_string()),
        recorded_at: state.clock.utc(),
    };

    info!(
        agent = %prompt.agent_id,
        prompt_type = %prompt.prompt_type,
        model = %prompt.model_used,
        chars = prompt.prompt_content.len(),
        "Prompt logged"
    );
    let logged = record(&state, ActivityRecord::Prompt(prompt)).await;
    Ok(Json(LoggedResponse {
        success: true,
        logged,
    }))
}

async fn record(state: &AppState, record: ActivityRecord) -> bool {
    match state.sink.record(&record).await {
        Ok(()) => true,
        Err(error) => {
            warn!(category = ?record.category(), %error, "Failed to record activity");
            false
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
