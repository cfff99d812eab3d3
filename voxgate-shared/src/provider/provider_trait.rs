/// Core SpeechProvider trait and types
///
/// This module defines the contract for talking to the upstream
/// text-to-speech service. The rest of the system never touches HTTP
/// directly; it goes through a `SpeechProvider` implementation.
///
/// # Provider Contract
///
/// All providers must:
/// 1. Implement the `SpeechProvider` trait (async)
/// 2. Perform exactly one upstream call per method, with no retries
/// 3. Map upstream field names onto the internal types defined here
/// 4. Report failures as typed `ProviderError`s rather than panicking
///
/// Synthesis is asynchronous on the provider side: `submit` returns an
/// external task id immediately, and the result arrives later, either by
/// polling `fetch_status` or through the webhook receiver.
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
///     input: "Hello from VoxGate".to_string(),
///     voice_id: "rachel".to_string(),
///     ..Default::default()
/// };
///
/// let external_id = provider.submit(&request).await?;
/// let update = provider.fetch_status(&external_id).await?;
/// println!("status: {:?}", update.status);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::task::TaskStatus;

/// Model used when a request does not specify one
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// Default synthesis parameters, applied when the request leaves them unset
pub const DEFAULT_STYLE: f64 = 0.0;
pub const DEFAULT_SPEED: f64 = 1.0;
pub const DEFAULT_SIMILARITY: f64 = 0.75;
pub const DEFAULT_STABILITY: f64 = 0.5;

/// Default subtitle cue layout
pub const DEFAULT_MAX_CHARACTERS_PER_LINE: u32 = 42;
pub const DEFAULT_MAX_LINES_PER_CUE: u32 = 2;
pub const DEFAULT_MAX_SECONDS_PER_CUE: u32 = 7;

/// Provider error types
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider rejected our credentials
    #[error("Provider authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The provider rejected the request payload
    #[error("Provider rejected request: {0}")]
    InvalidRequest(String),

    /// The provider returned a non-success status
    #[error("Provider API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The provider could not be reached
    #[error("Failed to reach provider: {0}")]
    Connection(String),

    /// The provider response could not be decoded
    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

/// Provider result type alias
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A speech synthesis request
///
/// All synthesis parameters are optional; unset fields fall back to the
/// `DEFAULT_*` constants when the request is sent upstream. Serializes
/// with camelCase keys, matching the public API wire format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    /// Text to synthesize
    pub input: String,

    /// Provider voice identifier
    pub voice_id: String,

    /// Synthesis model (defaults to `DEFAULT_MODEL_ID`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    /// Style exaggeration, 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<f64>,

    /// Speaking speed, 0.7 to 1.2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    /// Whether to boost similarity to the original speaker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_speaker_boost: Option<bool>,

    /// Voice similarity, 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,

    /// Voice stability, 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,

    /// Whether to produce a subtitle file alongside the audio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_subtitle: Option<bool>,

    /// Subtitle layout overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_characters_per_line: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines_per_cue: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_seconds_per_cue: Option<u32>,
}

impl SynthesisRequest {
    /// Returns the model id, falling back to the default
    pub fn resolved_model_id(&self) -> &str {
        self.model_id.as_deref().unwrap_or(DEFAULT_MODEL_ID)
    }
}

/// Status snapshot fetched from the provider for one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdate {
    /// Mapped task status (see `map_provider_status`)
    pub status: TaskStatus,

    /// URL of the generated audio, present once completed
    pub result_url: Option<String>,

    /// URL of the generated subtitle file, present once completed
    pub subtitle_url: Option<String>,
}

/// Credit grant on the provider account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredit {
    /// Remaining credit amount
    pub amount: i64,

    /// When the grant expires, if it does
    pub expire_at: Option<DateTime<Utc>>,
}

/// Provider account information
///
/// This is the shared upstream account the whole deployment runs on, not
/// a per-user balance. It backs the balance display on the user endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Remaining balance on the provider account
    pub balance: i64,

    /// Outstanding credit grants
    pub credits: Vec<ProviderCredit>,
}

/// A voice from the provider's catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    /// Provider voice identifier
    pub voice_id: String,

    /// Human-readable voice name
    pub name: String,

    /// Voice category (e.g., "premade", "cloned")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// URL of a short audio preview
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,

    /// Free-form descriptive labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<serde_json::Value>,
}

/// Maps a raw provider status string onto the internal enum
///
/// Matching is case-insensitive. Unrecognized values map to `Pending`,
/// so a status string this build does not know about leaves the task
/// in its non-terminal polling state instead of failing it.
pub fn map_provider_status(raw: &str) -> TaskStatus {
    match raw.to_ascii_lowercase().as_str() {
        "completed" => TaskStatus::Completed,
        "failed" => TaskStatus::Failed,
        "processing" => TaskStatus::Processing,
        _ => TaskStatus::Pending,
    }
}

/// Core SpeechProvider trait
///
/// Each method performs exactly one upstream call. Retries, backoff, and
/// partial-failure policy are the caller's concern.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Returns the provider name, used for logging
    fn name(&self) -> &str;

    /// Submits a synthesis task and returns the external task id
    async fn submit(&self, request: &SynthesisRequest) -> ProviderResult<String>;

    /// Fetches the current status of a previously submitted task
    async fn fetch_status(&self, external_task_id: &str) -> ProviderResult<TaskStatusUpdate>;

    /// Fetches balance and credit information for the provider account
    async fn fetch_account(&self) -> ProviderResult<AccountInfo>;

    /// Deletes a task on the provider side
    ///
    /// Callers treat failures here as non-fatal; local state is
    /// authoritative for deletion.
    async fn delete_task(&self, external_task_id: &str) -> ProviderResult<()>;

    /// Fetches the provider's voice catalog
    async fn list_voices(&self) -> ProviderResult<Vec<Voice>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_provider_status_known_values() {
        assert_eq!(map_provider_status("pending"), TaskStatus::Pending);
        assert_eq!(map_provider_status("processing"), TaskStatus::Processing);
        assert_eq!(map_provider_status("completed"), TaskStatus::Completed);
        assert_eq!(map_provider_status("failed"), TaskStatus::Failed);
    }

    #[test]
    fn test_map_provider_status_case_insensitive() {
        assert_eq!(map_provider_status("COMPLETED"), TaskStatus::Completed);
        assert_eq!(map_provider_status("Processing"), TaskStatus::Processing);
    }

    #[test]
    fn test_map_provider_status_unknown_defaults_to_pending() {
        assert_eq!(map_provider_status("queued"), TaskStatus::Pending);
        assert_eq!(map_provider_status("in_progress"), TaskStatus::Pending);
        assert_eq!(map_provider_status(""), TaskStatus::Pending);
    }

    #[test]
    fn test_resolved_model_id_default() {
        let request = SynthesisRequest {
            input: "hello".to_string(),
            voice_id: "rachel".to_string(),
            ..Default::default()
        };
        assert_eq!(request.resolved_model_id(), DEFAULT_MODEL_ID);
    }

    #[test]
    fn test_resolved_model_id_explicit() {
        let request = SynthesisRequest {
            input: "hello".to_string(),
            voice_id: "rachel".to_string(),
            model_id: Some("eleven_turbo_v2".to_string()),
            ..Default::default()
        };
        assert_eq!(request.resolved_model_id(), "eleven_turbo_v2");
    }

    #[test]
    fn test_synthesis_request_camel_case_wire_format() {
        let json = serde_json::json!({
            "input": "hello",
            "voiceId": "rachel",
            "useSpeakerBoost": true,
            "maxCharactersPerLine": 30
        });

        let request: SynthesisRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.voice_id, "rachel");
        assert_eq!(request.use_speaker_boost, Some(true));
        assert_eq!(request.max_characters_per_line, Some(30));
        assert_eq!(request.style, None);

        let serialized = serde_json::to_value(&request).unwrap();
        assert_eq!(serialized["voiceId"], "rachel");
        assert!(serialized.get("style").is_none());
    }

    #[test]
    fn test_voice_serialization() {
        let voice = Voice {
            voice_id: "rachel".to_string(),
            name: "Rachel".to_string(),
            category: Some("premade".to_string()),
            preview_url: None,
            labels: None,
        };

        let json = serde_json::to_value(&voice).unwrap();
        assert_eq!(json["voiceId"], "rachel");
        assert_eq!(json["category"], "premade");
        assert!(json.get("previewUrl").is_none());
    }
}
