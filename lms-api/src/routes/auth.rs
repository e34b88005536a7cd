/// Authentication endpoints
///
/// - `POST /api/v1/auth/login`: `{email, password}` to `{jwt, user}`

use crate::{
    app::AppState,
    envelope::Envelope,
    error::ApiResult,
    extract::ValidJson,
    services::auth::{LoginRequest, LoginResponse},
};
use axum::extract::State;

/// Login handler
///
/// Unknown email and wrong password both answer 403 with the service message.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Envelope<LoginResponse>> {
    Ok(state.auth.login(req).await?)
}
