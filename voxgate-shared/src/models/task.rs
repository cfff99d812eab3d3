/// Task model and database operations
///
/// This module provides the Task model representing speech synthesis jobs.
/// A task is created when the provider accepts a submission and is updated
/// by status reconciliation or the completion webhook.
///
/// # State Machine
///
/// ```text
/// pending → processing → completed
///                      → failed
/// pending → completed
/// pending → failed
/// ```
///
/// Completed and failed are terminal; no transition leaves them.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'processing', 'completed', 'failed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     input TEXT NOT NULL,
///     voice_id VARCHAR(100) NOT NULL,
///     model_id VARCHAR(100) NOT NULL,
///     style DOUBLE PRECISION,
///     speed DOUBLE PRECISION,
///     use_speaker_boost BOOLEAN,
///     similarity DOUBLE PRECISION,
///     stability DOUBLE PRECISION,
///     status task_status NOT NULL DEFAULT 'pending',
///     external_task_id VARCHAR(255),
///     result_url TEXT,
///     subtitle_url TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use voxgate_shared::models::task::{Task, CreateTask};
/// use voxgate_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     user_id: Uuid::new_v4(),
///     input: "Hello world".to_string(),
///     voice_id: "v1".to_string(),
///     model_id: "eleven_multilingual_v2".to_string(),
///     style: None,
///     speed: None,
///     use_speaker_boost: None,
///     similarity: None,
///     stability: None,
///     external_task_id: "ext-123".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task synthesis status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Provider accepted the job, synthesis not started
    Pending,

    /// Provider is synthesizing audio
    Processing,

    /// Audio (and optionally subtitles) are ready
    Completed,

    /// Provider reported a permanent failure
    Failed,
}

impl TaskStatus {
    /// Converts status to its lowercase wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Checks if status is terminal (job has finished)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Checks if status is active (job is in progress)
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Processing)
    }

    /// Checks if transition to target status is valid
    ///
    /// Transitions only move forward; terminal statuses accept nothing.
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        match (self, target) {
            (TaskStatus::Pending, TaskStatus::Processing) => true,
            (TaskStatus::Pending, TaskStatus::Completed) => true,
            (TaskStatus::Pending, TaskStatus::Failed) => true,

            (TaskStatus::Processing, TaskStatus::Completed) => true,
            (TaskStatus::Processing, TaskStatus::Failed) => true,

            _ => false,
        }
    }
}

/// Task model representing one speech synthesis job
///
/// Serializes with camelCase keys; task rows go out on the wire as-is in
/// list and detail responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user; every read and write is scoped by this
    pub user_id: Uuid,

    /// Text submitted for synthesis (1-5000 characters)
    pub input: String,

    /// Provider voice identifier
    pub voice_id: String,

    /// Provider model identifier (resolved at creation)
    pub model_id: String,

    /// Style exaggeration, 0.0-1.0
    pub style: Option<f64>,

    /// Speaking speed multiplier, 0.7-1.2
    pub speed: Option<f64>,

    /// Whether speaker boost was requested
    pub use_speaker_boost: Option<bool>,

    /// Similarity setting, 0.0-1.0
    pub similarity: Option<f64>,

    /// Stability setting, 0.0-1.0
    pub stability: Option<f64>,

    /// Current synthesis status
    pub status: TaskStatus,

    /// Provider-side task identifier, set once at creation
    pub external_task_id: Option<String>,

    /// Audio URL, populated only when status is completed
    pub result_url: Option<String>,

    /// Subtitle URL, populated only when status is completed
    pub subtitle_url: Option<String>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// The provider has already accepted the job by the time this is inserted,
/// so the external task ID is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub user_id: Uuid,
    pub input: String,
    pub voice_id: String,
    pub model_id: String,
    pub style: Option<f64>,
    pub speed: Option<f64>,
    pub use_speaker_boost: Option<bool>,
    pub similarity: Option<f64>,
    pub stability: Option<f64>,
    pub external_task_id: String,
}

/// Task row joined with its owner, for the admin listing
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithOwner {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub input: String,
    pub voice_id: String,
    pub status: TaskStatus,
    pub external_task_id: Option<String>,
    pub result_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in pending status
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `data` - Task creation data, including the provider-assigned ID
    ///
    /// # Returns
    ///
    /// The newly created task
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (unknown user, connection loss)
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, input, voice_id, model_id, style, speed,
                               use_speaker_boost, similarity, stability, external_task_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, user_id, input, voice_id, model_id, style, speed,
                      use_speaker_boost, similarity, stability, status,
                      external_task_id, result_url, subtitle_url, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.input)
        .bind(data.voice_id)
        .bind(data.model_id)
        .bind(data.style)
        .bind(data.speed)
        .bind(data.use_speaker_boost)
        .bind(data.similarity)
        .bind(data.stability)
        .bind(data.external_task_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, input, voice_id, model_id, style, speed,
                   use_speaker_boost, similarity, stability, status,
                   external_task_id, result_url, subtitle_url, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID scoped to its owner
    ///
    /// This is the method API endpoints use; a task owned by someone else
    /// is indistinguishable from a missing one.
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, input, voice_id, model_id, style, speed,
                   use_speaker_boost, similarity, stability, status,
                   external_task_id, result_url, subtitle_url, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by its provider-side identifier
    ///
    /// Used by the completion webhook, which only knows the external ID.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_task_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, input, voice_id, model_id, style, speed,
                   use_speaker_boost, similarity, stability, status,
                   external_task_id, result_url, subtitle_url, created_at, updated_at
            FROM tasks
            WHERE external_task_id = $1
            "#,
        )
        .bind(external_task_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Writes a reconciled status back to the row
    ///
    /// URLs are only stored alongside a completed status; callers pass None
    /// otherwise. Last write wins; concurrent reconciles are tolerated.
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: TaskStatus,
        result_url: Option<&str>,
        subtitle_url: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2,
                result_url = COALESCE($3, result_url),
                subtitle_url = COALESCE($4, subtitle_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, input, voice_id, model_id, style, speed,
                      use_speaker_boost, similarity, stability, status,
                      external_task_id, result_url, subtitle_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(result_url)
        .bind(subtitle_url)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Marks a task completed with its result URLs
    ///
    /// The status filter makes the update a no-op when the row is already
    /// terminal, so a late webhook cannot overwrite a failed task even if
    /// two callbacks race.
    pub async fn complete(
        pool: &PgPool,
        id: Uuid,
        result_url: Option<&str>,
        subtitle_url: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = 'completed',
                result_url = $2,
                subtitle_url = $3,
                updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'processing')
            RETURNING id, user_id, input, voice_id, model_id, style, speed,
                      use_speaker_boost, similarity, stability, status,
                      external_task_id, result_url, subtitle_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(result_url)
        .bind(subtitle_url)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists tasks for an owner with pagination, newest first
    pub async fn list_by_owner(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, input, voice_id, model_id, style, speed,
                   use_speaker_boost, similarity, stability, status,
                   external_task_id, result_url, subtitle_url, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Counts tasks owned by a user
    pub async fn count_by_owner(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Lists all tasks joined with their owners, newest first
    ///
    /// Backs the admin task table.
    pub async fn list_with_owner(pool: &PgPool) -> Result<Vec<TaskWithOwner>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TaskWithOwner>(
            r#"
            SELECT t.id, t.user_id, u.email, u.username, t.input, t.voice_id,
                   t.status, t.external_task_id, t.result_url, t.created_at
            FROM tasks t
            JOIN users u ON u.id = t.user_id
            ORDER BY t.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Counts all tasks
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts tasks in a given status
    pub async fn count_by_status(
        pool: &PgPool,
        status: TaskStatus,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE status = $1")
                .bind(status)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Pending.as_str(), "pending");
        assert_eq!(TaskStatus::Processing.as_str(), "processing");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
        assert_eq!(TaskStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn test_task_status_is_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn test_task_status_is_active() {
        assert!(TaskStatus::Pending.is_active());
        assert!(TaskStatus::Processing.is_active());
        assert!(!TaskStatus::Completed.is_active());
        assert!(!TaskStatus::Failed.is_active());
    }

    #[test]
    fn test_task_status_transitions() {
        // Pending can reach every later status
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Processing));
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Failed));

        // Processing can only finish
        assert!(TaskStatus::Processing.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::Processing.can_transition_to(TaskStatus::Failed));
        assert!(!TaskStatus::Processing.can_transition_to(TaskStatus::Pending));

        // Terminal statuses accept nothing
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Failed));
        assert!(!TaskStatus::Failed.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Processing));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&TaskStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");

        let parsed: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, TaskStatus::Completed);
    }
}
