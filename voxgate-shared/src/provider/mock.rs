/// Mock provider for testing and demos
///
/// This provider never touches the network. It hands out deterministic
/// external task ids, counts every call per method, and can be told to
/// fail specific operations, which makes it possible to assert things like
/// "reconciling a terminal task performs no provider call" or "local
/// deletion proceeds even when the provider delete fails".
///
/// # Behavior
///
/// - `submit` returns ids numbered in call order and prefixed with a
///   per-instance nonce ("mock-3f2a9c1d-1", ...), so tasks from two mock
///   instances sharing one database never collide
/// - `fetch_status` returns the configured status snapshot
///   (default: PROCESSING with no URLs)
/// - `fetch_account` returns a fixed account with a positive balance
/// - `delete_task` succeeds unless told to fail
/// - `list_voices` returns a small fixed catalog
///
/// # Example
///
/// ```no_run
/// use voxgate_shared::provider::{MockProvider, SpeechProvider, SynthesisRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = MockProvider::new();
///
/// let request = SynthesisRequest {
///     input: "Hello".to_string(),
///     voice_id: "rachel".to_string(),
///     ..Default::default()
/// };
///
/// let id = provider.submit(&request).await?;
/// assert!(id.ends_with("-1"));
/// assert_eq!(provider.submit_calls(), 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use crate::models::task::TaskStatus;
use crate::provider::provider_trait::{
    AccountInfo, ProviderCredit, ProviderError, ProviderResult, SpeechProvider, SynthesisRequest,
    TaskStatusUpdate, Voice,
};

/// Mock provider implementation
pub struct MockProvider {
    /// Nonce distinguishing the ids handed out by this instance
    instance: String,

    submit_calls: AtomicUsize,
    status_calls: AtomicUsize,
    account_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    voices_calls: AtomicUsize,

    fail_submit: AtomicBool,
    fail_status: AtomicBool,
    fail_delete: AtomicBool,

    next_status: Mutex<TaskStatusUpdate>,
}

impl MockProvider {
    /// Creates a mock provider with all operations succeeding
    pub fn new() -> Self {
        let nonce = Uuid::new_v4().simple().to_string();

        MockProvider {
            instance: nonce[..8].to_string(),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            account_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            voices_calls: AtomicUsize::new(0),
            fail_submit: AtomicBool::new(false),
            fail_status: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            next_status: Mutex::new(TaskStatusUpdate {
                status: TaskStatus::Processing,
                result_url: None,
                subtitle_url: None,
            }),
        }
    }

    /// Sets the snapshot returned by subsequent `fetch_status` calls
    pub fn set_next_status(&self, update: TaskStatusUpdate) {
        *self
            .next_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = update;
    }

    /// Makes subsequent `submit` calls fail
    pub fn set_fail_submit(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `fetch_status` calls fail
    pub fn set_fail_status(&self, fail: bool) {
        self.fail_status.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `delete_task` calls fail
    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Number of `submit` calls so far
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_status` calls so far
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_account` calls so far
    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }

    /// Number of `delete_task` calls so far
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Number of `list_voices` calls so far
    pub fn voices_calls(&self) -> usize {
        self.voices_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, request: &SynthesisRequest) -> ProviderResult<String> {
        let call = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(ProviderError::Api {
                status: 500,
                message: "Simulated submit failure".to_string(),
            });
        }

        tracing::debug!(
            voice_id = %request.voice_id,
            call,
            "Mock provider accepted synthesis task"
        );
        Ok(format!("mock-{}-{}", self.instance, call))
    }

    async fn fetch_status(&self, _external_task_id: &str) -> ProviderResult<TaskStatusUpdate> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_status.load(Ordering::SeqCst) {
            return Err(ProviderError::Connection(
                "Simulated status failure".to_string(),
            ));
        }

        Ok(self
            .next_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn fetch_account(&self) -> ProviderResult<AccountInfo> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);

        Ok(AccountInfo {
            balance: 250_000,
            credits: vec![ProviderCredit {
                amount: 250_000,
                expire_at: None,
            }],
        })
    }

    async fn delete_task(&self, external_task_id: &str) -> ProviderResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ProviderError::Api {
                status: 500,
                message: "Simulated delete failure".to_string(),
            });
        }

        tracing::debug!(external_task_id = %external_task_id, "Mock provider task deleted");
        Ok(())
    }

    async fn list_voices(&self) -> ProviderResult<Vec<Voice>> {
        self.voices_calls.fetch_add(1, Ordering::SeqCst);

        Ok(vec![
            Voice {
                voice_id: "rachel".to_string(),
                name: "Rachel".to_string(),
                category: Some("premade".to_string()),
                preview_url: None,
                labels: None,
            },
            Voice {
                voice_id: "adam".to_string(),
                name: "Adam".to_string(),
                category: Some("premade".to_string()),
                preview_url: None,
                labels: None,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SynthesisRequest {
        SynthesisRequest {
            input: "hello".to_string(),
            voice_id: "rachel".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_provider_name() {
        let provider = MockProvider::new();
        assert_eq!(provider.name(), "mock");
    }

    #[tokio::test]
    async fn test_submit_returns_sequential_ids() {
        let provider = MockProvider::new();

        let first = provider.submit(&request()).await.unwrap();
        let second = provider.submit(&request()).await.unwrap();

        assert!(first.starts_with("mock-") && first.ends_with("-1"));
        assert!(second.ends_with("-2"));
        assert_eq!(provider.submit_calls(), 2);
    }

    #[tokio::test]
    async fn test_submit_ids_unique_across_instances() {
        let a = MockProvider::new();
        let b = MockProvider::new();

        let from_a = a.submit(&request()).await.unwrap();
        let from_b = b.submit(&request()).await.unwrap();

        assert_ne!(from_a, from_b);
    }

    #[tokio::test]
    async fn test_submit_failure_injection() {
        let provider = MockProvider::new();
        provider.set_fail_submit(true);

        let result = provider.submit(&request()).await;
        assert!(result.is_err());
        assert_eq!(provider.submit_calls(), 1);

        provider.set_fail_submit(false);
        assert!(provider.submit(&request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_status_default_is_processing() {
        let provider = MockProvider::new();

        let update = provider.fetch_status("mock-task-1").await.unwrap();
        assert_eq!(update.status, TaskStatus::Processing);
        assert_eq!(update.result_url, None);
        assert_eq!(provider.status_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_status_configurable() {
        let provider = MockProvider::new();
        provider.set_next_status(TaskStatusUpdate {
            status: TaskStatus::Completed,
            result_url: Some("https://cdn.example.com/audio.mp3".to_string()),
            subtitle_url: Some("https://cdn.example.com/subs.srt".to_string()),
        });

        let update = provider.fetch_status("mock-task-1").await.unwrap();
        assert_eq!(update.status, TaskStatus::Completed);
        assert_eq!(
            update.result_url.as_deref(),
            Some("https://cdn.example.com/audio.mp3")
        );
    }

    #[tokio::test]
    async fn test_fetch_status_failure_injection_still_counts() {
        let provider = MockProvider::new();
        provider.set_fail_status(true);

        assert!(provider.fetch_status("mock-task-1").await.is_err());
        assert_eq!(provider.status_calls(), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_injection() {
        let provider = MockProvider::new();
        provider.set_fail_delete(true);

        assert!(provider.delete_task("mock-task-1").await.is_err());
        assert_eq!(provider.delete_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_account_fixed_balance() {
        let provider = MockProvider::new();

        let account = provider.fetch_account().await.unwrap();
        assert_eq!(account.balance, 250_000);
        assert_eq!(account.credits.len(), 1);
        assert_eq!(provider.account_calls(), 1);
    }

    #[tokio::test]
    async fn test_list_voices_fixed_catalog() {
        let provider = MockProvider::new();

        let voices = provider.list_voices().await.unwrap();
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].voice_id, "rachel");
        assert_eq!(provider.voices_calls(), 1);
    }
}
