/// HTTP SpeechProvider implementation
///
/// Talks to the upstream synthesis service over its JSON API, translating
/// between the internal types and the provider's snake_case wire format.
/// Every trait method is a single request with a single bearer-token
/// header; there is no retry or backoff at this layer.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::provider::provider_trait::{
    map_provider_status, AccountInfo, ProviderCredit, ProviderError, ProviderResult,
    SpeechProvider, SynthesisRequest, TaskStatusUpdate, Voice, DEFAULT_MAX_CHARACTERS_PER_LINE,
    DEFAULT_MAX_LINES_PER_CUE, DEFAULT_MAX_SECONDS_PER_CUE, DEFAULT_SIMILARITY, DEFAULT_SPEED,
    DEFAULT_STABILITY, DEFAULT_STYLE,
};

const REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// SpeechProvider backed by the real upstream HTTP API
pub struct HttpProvider {
    client: Client,
    base_url: String,
    api_token: String,
}

impl HttpProvider {
    /// Creates a provider for the given base URL and bearer token
    ///
    /// Trailing slashes on the base URL are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| {
                ProviderError::Connection(format!("Failed to build HTTP client: {}", e))
            })?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(HttpProvider {
            client,
            base_url,
            api_token: api_token.into(),
        })
    }

    /// Converts a non-success response into a typed error
    async fn check(&self, response: Response) -> ProviderResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        tracing::error!("Provider API error ({status}): {error_text}");

        Err(match status.as_u16() {
            401 => ProviderError::AuthenticationFailed(error_text),
            400 => ProviderError::InvalidRequest(error_text),
            _ => ProviderError::Api {
                status: status.as_u16(),
                message: error_text,
            },
        })
    }
}

/// Submit payload in the provider's flat snake_case schema
#[derive(Serialize)]
struct SubmitBody<'a> {
    input: &'a str,
    voice_id: &'a str,
    model_id: &'a str,
    style: f64,
    speed: f64,
    use_speaker_boost: bool,
    similarity: f64,
    stability: f64,
    export_subtitle: bool,
    max_characters_per_line: u32,
    max_lines_per_cue: u32,
    max_seconds_per_cue: u32,
}

fn build_submit_body(request: &SynthesisRequest) -> SubmitBody<'_> {
    SubmitBody {
        input: &request.input,
        voice_id: &request.voice_id,
        model_id: request.resolved_model_id(),
        style: request.style.unwrap_or(DEFAULT_STYLE),
        speed: request.speed.unwrap_or(DEFAULT_SPEED),
        use_speaker_boost: request.use_speaker_boost.unwrap_or(false),
        similarity: request.similarity.unwrap_or(DEFAULT_SIMILARITY),
        stability: request.stability.unwrap_or(DEFAULT_STABILITY),
        export_subtitle: request.export_subtitle.unwrap_or(false),
        max_characters_per_line: request
            .max_characters_per_line
            .unwrap_or(DEFAULT_MAX_CHARACTERS_PER_LINE),
        max_lines_per_cue: request.max_lines_per_cue.unwrap_or(DEFAULT_MAX_LINES_PER_CUE),
        max_seconds_per_cue: request
            .max_seconds_per_cue
            .unwrap_or(DEFAULT_MAX_SECONDS_PER_CUE),
    }
}

#[derive(Deserialize)]
struct SubmitResponse {
    task_id: String,
}

#[derive(Deserialize)]
struct StatusWire {
    #[serde(default)]
    status: String,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
}

#[derive(Deserialize)]
struct CreditWire {
    amount: i64,
    #[serde(default)]
    expire_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize)]
struct AccountWire {
    balance: i64,
    #[serde(default)]
    credits: Vec<CreditWire>,
}

#[derive(Deserialize)]
struct VoiceWire {
    voice_id: String,
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    preview_url: Option<String>,
    #[serde(default)]
    labels: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct VoicesWire {
    #[serde(default)]
    voices: Vec<VoiceWire>,
}

#[async_trait]
impl SpeechProvider for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit(&self, request: &SynthesisRequest) -> ProviderResult<String> {
        let url = format!("{}/api/elevenlabs/task", self.base_url);

        tracing::debug!(
            voice_id = %request.voice_id,
            model_id = %request.resolved_model_id(),
            input_len = request.input.len(),
            "Submitting synthesis task to provider"
        );

        let body = build_submit_body(request);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Provider submit request failed: {e}");
                ProviderError::Connection(format!("Failed to send submit request: {}", e))
            })?;

        let response = self.check(response).await?;

        let submit: SubmitResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("Invalid submit response: {}", e)))?;

        tracing::debug!(external_task_id = %submit.task_id, "Provider accepted synthesis task");
        Ok(submit.task_id)
    }

    async fn fetch_status(&self, external_task_id: &str) -> ProviderResult<TaskStatusUpdate> {
        let url = format!("{}/api/elevenlabs/task/{}", self.base_url, external_task_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Provider status request failed: {e}");
                ProviderError::Connection(format!("Failed to send status request: {}", e))
            })?;

        let response = self.check(response).await?;

        let wire: StatusWire = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("Invalid status response: {}", e)))?;

        Ok(TaskStatusUpdate {
            status: map_provider_status(&wire.status),
            result_url: wire.result,
            subtitle_url: wire.subtitle,
        })
    }

    async fn fetch_account(&self) -> ProviderResult<AccountInfo> {
        let url = format!("{}/api/me", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Provider account request failed: {e}");
                ProviderError::Connection(format!("Failed to send account request: {}", e))
            })?;

        let response = self.check(response).await?;

        let wire: AccountWire = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("Invalid account response: {}", e)))?;

        Ok(AccountInfo {
            balance: wire.balance,
            credits: wire
                .credits
                .into_iter()
                .map(|c| ProviderCredit {
                    amount: c.amount,
                    expire_at: c.expire_at,
                })
                .collect(),
        })
    }

    async fn delete_task(&self, external_task_id: &str) -> ProviderResult<()> {
        let url = format!("{}/api/elevenlabs/task/{}", self.base_url, external_task_id);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Provider delete request failed: {e}");
                ProviderError::Connection(format!("Failed to send delete request: {}", e))
            })?;

        self.check(response).await?;

        tracing::debug!(external_task_id = %external_task_id, "Provider task deleted");
        Ok(())
    }

    async fn list_voices(&self) -> ProviderResult<Vec<Voice>> {
        let url = format!("{}/api/voices", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Provider voices request failed: {e}");
                ProviderError::Connection(format!("Failed to send voices request: {}", e))
            })?;

        let response = self.check(response).await?;

        let wire: VoicesWire = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("Invalid voices response: {}", e)))?;

        Ok(wire
            .voices
            .into_iter()
            .map(|v| Voice {
                voice_id: v.voice_id,
                name: v.name,
                category: v.category,
                preview_url: v.preview_url,
                labels: v.labels,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let provider = HttpProvider::new("https://provider.example.com/", "token").unwrap();
        assert_eq!(provider.base_url, "https://provider.example.com");

        let provider = HttpProvider::new("https://provider.example.com", "token").unwrap();
        assert_eq!(provider.base_url, "https://provider.example.com");
    }

    #[test]
    fn test_submit_body_fills_defaults() {
        let request = SynthesisRequest {
            input: "hello".to_string(),
            voice_id: "rachel".to_string(),
            ..Default::default()
        };

        let body = build_submit_body(&request);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["input"], "hello");
        assert_eq!(json["voice_id"], "rachel");
        assert_eq!(json["model_id"], "eleven_multilingual_v2");
        assert_eq!(json["style"], 0.0);
        assert_eq!(json["speed"], 1.0);
        assert_eq!(json["use_speaker_boost"], false);
        assert_eq!(json["similarity"], 0.75);
        assert_eq!(json["stability"], 0.5);
        assert_eq!(json["export_subtitle"], false);
        assert_eq!(json["max_characters_per_line"], 42);
        assert_eq!(json["max_lines_per_cue"], 2);
        assert_eq!(json["max_seconds_per_cue"], 7);
    }

    #[test]
    fn test_submit_body_keeps_explicit_values() {
        let request = SynthesisRequest {
            input: "hello".to_string(),
            voice_id: "rachel".to_string(),
            model_id: Some("eleven_turbo_v2".to_string()),
            speed: Some(1.1),
            export_subtitle: Some(true),
            max_characters_per_line: Some(30),
            ..Default::default()
        };

        let body = build_submit_body(&request);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model_id"], "eleven_turbo_v2");
        assert_eq!(json["speed"], 1.1);
        assert_eq!(json["export_subtitle"], true);
        assert_eq!(json["max_characters_per_line"], 30);
    }

    #[test]
    fn test_status_wire_tolerates_missing_fields() {
        let wire: StatusWire = serde_json::from_str("{}").unwrap();
        assert_eq!(wire.status, "");
        assert_eq!(wire.result, None);
        assert_eq!(wire.subtitle, None);

        let update = TaskStatusUpdate {
            status: map_provider_status(&wire.status),
            result_url: wire.result,
            subtitle_url: wire.subtitle,
        };
        assert_eq!(update.status, crate::models::task::TaskStatus::Pending);
    }

    #[test]
    fn test_status_wire_full_payload() {
        let json = serde_json::json!({
            "id": "ext-123",
            "status": "completed",
            "result": "https://cdn.example.com/audio.mp3",
            "subtitle": "https://cdn.example.com/subs.srt",
            "created_at": "2025-01-01T00:00:00Z"
        });

        let wire: StatusWire = serde_json::from_value(json).unwrap();
        assert_eq!(wire.status, "completed");
        assert_eq!(
            wire.result.as_deref(),
            Some("https://cdn.example.com/audio.mp3")
        );
    }

    #[test]
    fn test_account_wire_deserialization() {
        let json = serde_json::json!({
            "id": "acct-1",
            "username": "voxgate",
            "balance": 250000,
            "credits": [
                { "amount": 100000, "expire_at": "2025-06-01T00:00:00Z" },
                { "amount": 150000 }
            ]
        });

        let wire: AccountWire = serde_json::from_value(json).unwrap();
        assert_eq!(wire.balance, 250000);
        assert_eq!(wire.credits.len(), 2);
        assert!(wire.credits[0].expire_at.is_some());
        assert!(wire.credits[1].expire_at.is_none());
    }
}
