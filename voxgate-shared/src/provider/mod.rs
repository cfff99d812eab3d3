/// Speech provider gateway
///
/// This module isolates every interaction with the upstream text-to-speech
/// service behind the `SpeechProvider` trait. Handlers and the task
/// lifecycle depend on the trait object, never on a concrete client.
///
/// # Implementations
///
/// - **Http**: the real upstream API over reqwest with bearer-token auth
/// - **Mock**: deterministic, call-counting, failure-injecting; used by
///   tests and local demos
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use voxgate_shared::provider::{HttpProvider, SpeechProvider};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider: Arc<dyn SpeechProvider> = Arc::new(HttpProvider::new(
///     "https://provider.example.com",
///     "api-token",
/// )?);
/// println!("provider: {}", provider.name());
/// # Ok(())
/// # }
/// ```

pub mod http;
pub mod mock;
pub mod provider_trait;

// Re-export main types
pub use http::HttpProvider;
pub use mock::MockProvider;
pub use provider_trait::{
    map_provider_status, AccountInfo, ProviderCredit, ProviderError, ProviderResult,
    SpeechProvider, SynthesisRequest, TaskStatusUpdate, Voice, DEFAULT_MODEL_ID,
};
