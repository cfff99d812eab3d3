/// Profile endpoint
///
/// Combines the local account record with live balance information from
/// the speech provider.
///
/// # Endpoint
///
/// ```text
/// GET /user
/// Authorization: Bearer <token>
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": "uuid",
///   "email": "user@example.com",
///   "username": "alice",
///   "isAdmin": false,
///   "balance": 250000,
///   "credits": [ { "amount": 250000, "expireAt": "2026-01-01T00:00:00Z" } ]
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use serde::Serialize;
use uuid::Uuid;
use voxgate_shared::auth::middleware::AuthContext;
use voxgate_shared::provider::ProviderCredit;

/// Profile response
///
/// `balance` and `credits` come from the provider account, not the local
/// ledger.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub balance: i64,
    pub credits: Vec<ProviderCredit>,
}

/// Profile handler
///
/// # Errors
///
/// - `502 Bad Gateway`: Provider account lookup failed
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProfileResponse>> {
    let account = state.provider.fetch_account().await?;

    Ok(Json(ProfileResponse {
        id: auth.user_id,
        email: auth.email,
        username: auth.username,
        is_admin: auth.is_admin,
        balance: account.balance,
        credits: account.credits,
    }))
}
