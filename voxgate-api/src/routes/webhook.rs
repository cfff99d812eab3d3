/// Provider completion callback
///
/// The provider calls this endpoint when a synthesis job finishes. The
/// request body is read raw so the HMAC signature can be verified over
/// the exact bytes before anything is parsed.
///
/// # Endpoint
///
/// ```text
/// POST /webhook/callback
/// X-Webhook-Signature: <hex HMAC-SHA256 of the body>
/// Content-Type: application/json
///
/// {
///   "id": "provider-task-id",
///   "result": "https://cdn.example.com/audio.mp3",
///   "subtitle": "https://cdn.example.com/audio.srt"
/// }
/// ```
///
/// # Responses
///
/// - `200 {"success": true}` - Task marked completed
/// - `400` - Body is not valid JSON
/// - `401` - Missing or wrong signature, body untouched
/// - `404` - No task with that provider ID, nothing mutated
/// - `409` - Task already reached a final status, nothing mutated

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use voxgate_shared::webhook::{verify_signature, SIGNATURE_HEADER};

/// Callback payload, using the provider's field names
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    /// Provider-side task identifier
    pub id: String,

    /// URL of the finished audio
    pub result: Option<String>,

    /// URL of the subtitle file, when one was requested
    pub subtitle: Option<String>,
}

/// Callback acknowledgement
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
}

/// Callback handler
pub async fn handle_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing webhook signature".to_string()))?;

    if !verify_signature(state.webhook_secret(), &body, signature) {
        tracing::warn!("Webhook callback with invalid signature");
        return Err(ApiError::Unauthorized(
            "Invalid webhook signature".to_string(),
        ));
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|error| ApiError::BadRequest(format!("Invalid webhook payload: {}", error)))?;

    let task = state
        .lifecycle
        .complete_from_webhook(
            &payload.id,
            payload.result.as_deref(),
            payload.subtitle.as_deref(),
        )
        .await?;

    tracing::info!(
        task_id = %task.id,
        external_task_id = %payload.id,
        "Webhook callback processed"
    );

    Ok(Json(WebhookResponse { success: true }))
}
