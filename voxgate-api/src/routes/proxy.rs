/// Audio relay
///
/// Streams provider-hosted audio through this server so the provider's
/// origin never appears in the browser. The upstream response body is
/// forwarded chunk by chunk, not buffered.
///
/// # Endpoint
///
/// ```text
/// GET /proxy/audio?url=https://cdn.example.com/audio.mp3
/// ```
///
/// Responds with the upstream bytes, the upstream Content-Type (falling
/// back to `audio/mpeg`), and a one hour cache header.

use crate::{app::AppState, error::ApiError};
use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::Response,
};
use serde::Deserialize;

/// Relay query parameters
#[derive(Debug, Deserialize)]
pub struct AudioQuery {
    /// Absolute URL of the audio resource to relay
    pub url: String,
}

/// Relay handler
///
/// # Errors
///
/// - `400 Bad Request`: URL is not http or https
/// - `502 Bad Gateway`: Upstream fetch failed or answered non-2xx
pub async fn relay_audio(
    State(state): State<AppState>,
    Query(query): Query<AudioQuery>,
) -> Result<Response, ApiError> {
    if !query.url.starts_with("http://") && !query.url.starts_with("https://") {
        return Err(ApiError::BadRequest(
            "Only http and https URLs can be relayed".to_string(),
        ));
    }

    let upstream = state
        .relay
        .get(&query.url)
        .send()
        .await
        .map_err(|error| ApiError::UpstreamError(format!("Audio fetch failed: {}", error)))?;

    if !upstream.status().is_success() {
        return Err(ApiError::UpstreamError(format!(
            "Audio fetch returned status {}",
            upstream.status()
        )));
    }

    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("audio/mpeg")
        .to_string();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|error| {
            ApiError::InternalError(format!("Failed to build relay response: {}", error))
        })?;

    Ok(response)
}
