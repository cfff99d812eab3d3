/// Task lifecycle service
///
/// This module coordinates the two systems a task lives in: the local
/// database (authoritative for ownership and status) and the upstream
/// speech provider (authoritative for synthesis progress). Every handler
/// that touches tasks goes through this service.
///
/// # Flow
///
/// ```text
/// create:    provider submit ──> local insert
///            (submit fails  ──> no row; insert fails ──> compensating
///             provider delete, then the error surfaces)
/// reconcile: local read ──> provider poll ──> guarded write-back
///            (terminal rows are returned without polling)
/// delete:    provider delete (best effort) ──> local delete (always)
/// webhook:   lookup by external id ──> guarded completion
/// ```
///
/// # Status Invariants
///
/// Status only moves forward: PENDING → PROCESSING → {COMPLETED, FAILED}.
/// A provider answer that would move a task backwards, or out of a
/// terminal state, is discarded.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sqlx::PgPool;
/// use uuid::Uuid;
/// use voxgate_shared::lifecycle::TaskLifecycle;
/// use voxgate_shared::provider::{MockProvider, SynthesisRequest};
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let lifecycle = TaskLifecycle::new(pool, Arc::new(MockProvider::new()));
///
/// let request = SynthesisRequest {
///     input: "Hello from VoxGate".to_string(),
///     voice_id: "rachel".to_string(),
///     ..Default::default()
/// };
///
/// let task = lifecycle.create(user_id, request).await?;
/// let task = lifecycle.reconcile(task.id, user_id).await?;
/// println!("status: {:?}", task.status);
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::task::{CreateTask, Task, TaskStatus};
use crate::provider::{ProviderError, SpeechProvider, SynthesisRequest};

/// Default page size for task listings
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Upper bound on requested page size
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Lifecycle error types
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The task does not exist, or is not owned by the caller
    #[error("Task not found")]
    NotFound,

    /// The task already reached COMPLETED or FAILED
    #[error("Task already reached a final status")]
    AlreadyFinished,

    /// The provider call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Normalized pagination parameters
///
/// Page numbers start at 1; out-of-range requests are clamped rather
/// than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl PageParams {
    /// Builds parameters from raw query values, applying defaults and bounds
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        PageParams { page, limit }
    }

    /// Row offset for the current page
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for PageParams {
    fn default() -> Self {
        PageParams::new(None, None)
    }
}

/// One page of a task listing
#[derive(Debug, Clone)]
pub struct TaskPage {
    /// Tasks on this page, newest first
    pub tasks: Vec<Task>,

    /// Total tasks owned by the user across all pages
    pub total: i64,

    pub page: u32,
    pub limit: u32,
}

/// Task lifecycle service
///
/// Holds the database pool and the provider gateway; both are injected at
/// startup and shared across requests.
pub struct TaskLifecycle {
    db: PgPool,
    provider: Arc<dyn SpeechProvider>,
}

impl TaskLifecycle {
    /// Creates a new lifecycle service
    pub fn new(db: PgPool, provider: Arc<dyn SpeechProvider>) -> Self {
        TaskLifecycle { db, provider }
    }

    /// The provider gateway this service talks to
    pub fn provider(&self) -> &Arc<dyn SpeechProvider> {
        &self.provider
    }

    /// Creates a task: submits to the provider, then persists the row
    ///
    /// The provider call happens first, so a rejected submission leaves no
    /// local row. If the local insert fails after a successful submission,
    /// the just-created provider task is deleted best-effort before the
    /// insert error is returned, so neither side accumulates orphans.
    ///
    /// # Errors
    ///
    /// Returns `Provider` if the submission fails and `Database` if the
    /// insert fails.
    pub async fn create(
        &self,
        user_id: Uuid,
        request: SynthesisRequest,
    ) -> Result<Task, LifecycleError> {
        let external_task_id = self.provider.submit(&request).await?;

        let data = CreateTask {
            user_id,
            input: request.input,
            voice_id: request.voice_id,
            model_id: request
                .model_id
                .unwrap_or_else(|| crate::provider::DEFAULT_MODEL_ID.to_string()),
            style: request.style,
            speed: request.speed,
            use_speaker_boost: request.use_speaker_boost,
            similarity: request.similarity,
            stability: request.stability,
            external_task_id: external_task_id.clone(),
        };

        match Task::create(&self.db, data).await {
            Ok(task) => {
                tracing::info!(
                    task_id = %task.id,
                    user_id = %user_id,
                    external_task_id = %external_task_id,
                    "Task created"
                );
                Ok(task)
            }
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    external_task_id = %external_task_id,
                    error = %e,
                    "Failed to persist task after provider accepted it"
                );
                if let Err(delete_err) = self.provider.delete_task(&external_task_id).await {
                    tracing::warn!(
                        external_task_id = %external_task_id,
                        error = %delete_err,
                        "Compensating provider delete failed; external task may linger"
                    );
                }
                Err(LifecycleError::Database(e))
            }
        }
    }

    /// Returns a task, refreshing non-terminal status from the provider
    ///
    /// Terminal tasks are returned as stored without any provider call.
    /// For active tasks the provider is polled once; the answer is written
    /// back only if it is a valid forward transition. When the provider is
    /// unreachable the stored (possibly stale) row is returned instead of
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the task does not exist or belongs to another
    /// user.
    pub async fn reconcile(&self, task_id: Uuid, owner: Uuid) -> Result<Task, LifecycleError> {
        let task = Task::find_by_id_and_owner(&self.db, task_id, owner)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        if task.status.is_terminal() {
            return Ok(task);
        }

        let Some(external_task_id) = task.external_task_id.as_deref() else {
            // Nothing to poll; the row never received a provider id
            tracing::warn!(task_id = %task.id, "Task has no external id, returning stored status");
            return Ok(task);
        };

        let update = match self.provider.fetch_status(external_task_id).await {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!(
                    task_id = %task.id,
                    external_task_id = %external_task_id,
                    error = %e,
                    "Provider status fetch failed, returning stored status"
                );
                return Ok(task);
            }
        };

        if update.status == task.status || !task.status.can_transition_to(update.status) {
            return Ok(task);
        }

        let (result_url, subtitle_url) = if update.status == TaskStatus::Completed {
            (update.result_url.as_deref(), update.subtitle_url.as_deref())
        } else {
            (None, None)
        };

        tracing::info!(
            task_id = %task.id,
            from = %task.status.as_str(),
            to = %update.status.as_str(),
            "Task status reconciled from provider"
        );

        Task::update_status(&self.db, task.id, update.status, result_url, subtitle_url)
            .await?
            .ok_or(LifecycleError::NotFound)
    }

    /// Deletes a task locally after a best-effort provider-side delete
    ///
    /// A provider failure is logged and ignored; the local row is removed
    /// regardless, so the user's listing never shows undeletable tasks.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the task does not exist or belongs to another
    /// user.
    pub async fn delete(&self, task_id: Uuid, owner: Uuid) -> Result<(), LifecycleError> {
        let task = Task::find_by_id_and_owner(&self.db, task_id, owner)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        if let Some(external_task_id) = task.external_task_id.as_deref() {
            if let Err(e) = self.provider.delete_task(external_task_id).await {
                tracing::warn!(
                    task_id = %task.id,
                    external_task_id = %external_task_id,
                    error = %e,
                    "Provider delete failed, removing local row anyway"
                );
            }
        }

        Task::delete(&self.db, task.id).await?;

        tracing::info!(task_id = %task.id, user_id = %owner, "Task deleted");
        Ok(())
    }

    /// Lists the owner's tasks, newest first, with a total count
    pub async fn list(
        &self,
        owner: Uuid,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<TaskPage, LifecycleError> {
        let params = PageParams::new(page, limit);

        let tasks =
            Task::list_by_owner(&self.db, owner, params.limit as i64, params.offset()).await?;
        let total = Task::count_by_owner(&self.db, owner).await?;

        Ok(TaskPage {
            tasks,
            total,
            page: params.page,
            limit: params.limit,
        })
    }

    /// Completes a task from a provider callback
    ///
    /// Looks the task up by its external id and marks it COMPLETED with
    /// the delivered URLs. The write is guarded twice: once here against
    /// the loaded row, and once inside the UPDATE itself, so a callback
    /// racing another writer can never resurrect a terminal task.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown external id and `AlreadyFinished`
    /// when the task is already terminal.
    pub async fn complete_from_webhook(
        &self,
        external_task_id: &str,
        result_url: Option<&str>,
        subtitle_url: Option<&str>,
    ) -> Result<Task, LifecycleError> {
        let task = Task::find_by_external_id(&self.db, external_task_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(
                    external_task_id = %external_task_id,
                    "Webhook for unknown external task id"
                );
                LifecycleError::NotFound
            })?;

        if task.status.is_terminal() {
            tracing::warn!(
                task_id = %task.id,
                status = %task.status.as_str(),
                "Webhook for task already in a final status"
            );
            return Err(LifecycleError::AlreadyFinished);
        }

        let completed = Task::complete(&self.db, task.id, result_url, subtitle_url)
            .await?
            .ok_or(LifecycleError::AlreadyFinished)?;

        tracing::info!(
            task_id = %completed.id,
            external_task_id = %external_task_id,
            "Task completed via webhook"
        );
        Ok(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_defaults() {
        let params = PageParams::new(None, None);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_page_params_clamps_page() {
        let params = PageParams::new(Some(0), None);
        assert_eq!(params.page, 1);
    }

    #[test]
    fn test_page_params_clamps_limit() {
        assert_eq!(PageParams::new(None, Some(0)).limit, 1);
        assert_eq!(PageParams::new(None, Some(500)).limit, MAX_PAGE_LIMIT);
        assert_eq!(PageParams::new(None, Some(50)).limit, 50);
    }

    #[test]
    fn test_page_params_offset_math() {
        let params = PageParams::new(Some(3), Some(20));
        assert_eq!(params.offset(), 40);

        let params = PageParams::new(Some(1), Some(100));
        assert_eq!(params.offset(), 0);
    }

    // Lifecycle behavior against a live database is covered by
    // tests/lifecycle_tests.rs and the voxgate-api integration tests.
}
