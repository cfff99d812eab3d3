/// Admin management endpoints
///
/// Read aggregation over users and tasks plus the two account mutators.
/// Every route in this module sits behind the admin gate in the router;
/// handlers can assume the caller is an administrator.
///
/// # Endpoints
///
/// - `GET /admin/users` - All users with their task counts
/// - `GET /admin/tasks` - All tasks with owner info
/// - `GET /admin/stats` - Aggregate counters
/// - `PATCH /admin/users/:id/status` - Activate or deactivate an account
/// - `PATCH /admin/users/:id/balance` - Overwrite the balance ledger
///
/// Balances shown here are the local ledger, not the provider's live
/// balance.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use voxgate_shared::models::task::{Task, TaskStatus, TaskWithOwner};
use voxgate_shared::models::user::{User, UserWithTaskCount};

/// User listing response
#[derive(Debug, Serialize)]
pub struct AdminUsersResponse {
    pub users: Vec<UserWithTaskCount>,
}

/// Task listing response
#[derive(Debug, Serialize)]
pub struct AdminTasksResponse {
    pub tasks: Vec<AdminTaskView>,
}

/// Task row with its owner nested, as the admin UI renders it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTaskView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub input: String,
    pub voice_id: String,
    pub status: TaskStatus,
    pub external_task_id: Option<String>,
    pub result_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub user: TaskOwner,
}

/// Owning user summary nested in the admin task listing
#[derive(Debug, Serialize)]
pub struct TaskOwner {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<TaskWithOwner> for AdminTaskView {
    fn from(task: TaskWithOwner) -> Self {
        Self {
            id: task.id,
            user_id: task.user_id,
            input: task.input,
            voice_id: task.voice_id,
            status: task.status,
            external_task_id: task.external_task_id,
            result_url: task.result_url,
            created_at: task.created_at,
            user: TaskOwner {
                id: task.user_id,
                username: task.username,
                email: task.email,
            },
        }
    }
}

/// Aggregate counters
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponse {
    pub total_users: i64,
    pub active_users: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,

    /// Sum of the local balance ledger across all users
    pub total_balance: i64,
}

/// Account activation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub is_active: bool,
}

/// Balance override request
#[derive(Debug, Deserialize, Validate)]
pub struct SetBalanceRequest {
    #[validate(range(min = 0, message = "Balance must not be negative"))]
    pub balance: i64,
}

/// List all users with their task counts, newest first
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<AdminUsersResponse>> {
    let users = User::list_with_task_counts(&state.db).await?;

    Ok(Json(AdminUsersResponse { users }))
}

/// List all tasks with owner info, newest first
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<AdminTasksResponse>> {
    let tasks = Task::list_with_owner(&state.db).await?;

    Ok(Json(AdminTasksResponse {
        tasks: tasks.into_iter().map(AdminTaskView::from).collect(),
    }))
}

/// Aggregate statistics over users and tasks
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<AdminStatsResponse>> {
    let total_users = User::count(&state.db).await?;
    let active_users = User::count_active(&state.db).await?;
    let total_tasks = Task::count(&state.db).await?;
    let completed_tasks = Task::count_by_status(&state.db, TaskStatus::Completed).await?;
    let total_balance = User::sum_balance(&state.db).await?;

    Ok(Json(AdminStatsResponse {
        total_users,
        active_users,
        total_tasks,
        completed_tasks,
        total_balance,
    }))
}

/// Activate or deactivate an account
///
/// Deactivated accounts fail authentication on their next request, even
/// with a token that is still valid.
///
/// # Errors
///
/// - `404 Not Found`: No user with that ID
pub async fn set_user_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<User>> {
    let user = User::set_active(&state.db, id, req.is_active)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %id, is_active = req.is_active, "Admin changed account status");

    Ok(Json(user))
}

/// Overwrite a user's balance ledger
///
/// # Errors
///
/// - `404 Not Found`: No user with that ID
/// - `422 Unprocessable Entity`: Negative balance
pub async fn set_user_balance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetBalanceRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    let user = User::set_balance(&state.db, id, req.balance)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %id, balance = req.balance, "Admin set account balance");

    Ok(Json(user))
}
