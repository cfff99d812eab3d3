/// Provider voice catalog
///
/// Thin pass-through to the provider's voice listing so the client can
/// populate its voice picker without talking to the provider directly.
///
/// # Endpoint
///
/// ```text
/// GET /voices
/// Authorization: Bearer <token>
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::Serialize;
use voxgate_shared::provider::Voice;

/// Voice catalog response
#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<Voice>,
}

/// Voice catalog handler
///
/// # Errors
///
/// - `502 Bad Gateway`: Provider voice listing failed
pub async fn list_voices(State(state): State<AppState>) -> ApiResult<Json<VoicesResponse>> {
    let voices = state.provider.list_voices().await?;

    Ok(Json(VoicesResponse { voices }))
}
