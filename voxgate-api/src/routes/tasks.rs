/// Synthesis task endpoints
///
/// This module provides the task lifecycle endpoints:
/// - Create (submits to the provider, then records locally)
/// - List (paginated, newest first)
/// - Detail (refreshes from the provider when still in flight)
/// - Delete (best-effort provider delete, local row always removed)
/// - Check status (forced refresh)
///
/// # Endpoints
///
/// - `POST /tasks` - Submit a synthesis job
/// - `GET /tasks?page&limit` - List own tasks
/// - `GET /tasks/:id` - Task detail
/// - `DELETE /tasks/:id` - Remove a task
/// - `POST /tasks/:id/check-status` - Force a provider status refresh
///
/// All routes are scoped to the authenticated user; another user's task
/// answers 404.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use voxgate_shared::auth::middleware::AuthContext;
use voxgate_shared::models::task::{Task, TaskStatus};
use voxgate_shared::provider::SynthesisRequest;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Text to synthesize
    #[validate(length(min = 1, max = 5000, message = "Input must be 1 to 5000 characters"))]
    pub input: String,

    /// Provider voice identifier
    #[validate(length(min = 1, message = "Voice is required"))]
    pub voice_id: String,

    /// Synthesis model override
    pub model_id: Option<String>,

    #[validate(range(min = 0.0, max = 1.0, message = "Style must be between 0 and 1"))]
    pub style: Option<f64>,

    #[validate(range(min = 0.7, max = 1.2, message = "Speed must be between 0.7 and 1.2"))]
    pub speed: Option<f64>,

    pub use_speaker_boost: Option<bool>,

    #[validate(range(min = 0.0, max = 1.0, message = "Similarity must be between 0 and 1"))]
    pub similarity: Option<f64>,

    #[validate(range(min = 0.0, max = 1.0, message = "Stability must be between 0 and 1"))]
    pub stability: Option<f64>,
}

/// Create task response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskResponse {
    /// Local task ID
    pub id: Uuid,

    /// Provider-assigned task ID
    pub task_id: String,

    /// Always "pending" right after creation
    pub status: TaskStatus,
}

/// Paginated task list response
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Status summary returned by the check-status endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusResponse {
    pub id: Uuid,
    pub status: TaskStatus,
    pub result_url: Option<String>,
    pub subtitle_url: Option<String>,
}

/// Deletion confirmation
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Submit a new synthesis task
///
/// The job is submitted to the provider first; the local row is only
/// written once the provider has accepted it and assigned an ID.
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Content-Type: application/json
///
/// {
///   "input": "Hello world",
///   "voiceId": "21m00Tcm4TlvDq8ikWAM",
///   "speed": 1.0
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": "uuid",
///   "taskId": "provider-id",
///   "status": "pending"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `502 Bad Gateway`: Provider submission failed
/// - `500 Internal Server Error`: Local persistence failed
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<CreateTaskResponse>)> {
    req.validate()?;

    let request = SynthesisRequest {
        input: req.input,
        voice_id: req.voice_id,
        model_id: req.model_id,
        style: req.style,
        speed: req.speed,
        use_speaker_boost: req.use_speaker_boost,
        similarity: req.similarity,
        stability: req.stability,
        ..SynthesisRequest::default()
    };

    let task = state.lifecycle.create(auth.user_id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            id: task.id,
            task_id: task.external_task_id.clone().unwrap_or_default(),
            status: task.status,
        }),
    ))
}

/// List the authenticated user's tasks
///
/// # Endpoint
///
/// ```text
/// GET /tasks?page=1&limit=20
/// ```
///
/// Returns tasks newest first along with the total count for building
/// pagination controls.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let page = state
        .lifecycle
        .list(auth.user_id, query.page, query.limit)
        .await?;

    Ok(Json(TaskListResponse {
        tasks: page.tasks,
        total: page.total,
        page: page.page,
        limit: page.limit,
    }))
}

/// Fetch one task
///
/// Tasks still in flight are reconciled against the provider before
/// being returned; if the provider is unreachable the stored row is
/// returned unchanged.
///
/// # Errors
///
/// - `404 Not Found`: No such task, or owned by someone else
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = state.lifecycle.reconcile(id, auth.user_id).await?;
    Ok(Json(task))
}

/// Delete a task
///
/// The provider-side job is deleted best-effort; the local row is
/// removed regardless of the provider call outcome.
///
/// # Errors
///
/// - `404 Not Found`: No such task, or owned by someone else
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.lifecycle.delete(id, auth.user_id).await?;

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// Force a provider status refresh
///
/// Same reconciliation as the detail endpoint, but returns only the
/// status fields the polling client cares about.
///
/// # Endpoint
///
/// ```text
/// POST /tasks/:id/check-status
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": "uuid",
///   "status": "completed",
///   "resultUrl": "https://...",
///   "subtitleUrl": null
/// }
/// ```
pub async fn check_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskStatusResponse>> {
    let task = state.lifecycle.reconcile(id, auth.user_id).await?;

    Ok(Json(TaskStatusResponse {
        id: task.id,
        status: task.status,
        result_url: task.result_url,
        subtitle_url: task.subtitle_url,
    }))
}
