use axum::extract::State;

use super::{body, JsonBody};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::auth::{ChangePasswordRequest, LoginRequest, RegisterRequest, Session};
use crate::services::AuthService;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    payload: JsonBody<RegisterRequest>,
) -> ApiResult<Session> {
    let session = AuthService::new(&state).register(body(payload)?).await?;
    Ok(ApiResponse::created(session).with_message("User registered successfully"))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: JsonBody<LoginRequest>,
) -> ApiResult<Session> {
    let session = AuthService::new(&state).login(body(payload)?).await?;
    Ok(ApiResponse::success(session).with_message("Login successful"))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, AuthUser(claims): AuthUser) -> ApiResult<User> {
    let user = AuthService::new(&state).me(claims.sub).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    payload: JsonBody<ChangePasswordRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    AuthService::new(&state)
        .change_password(claims.sub, body(payload)?)
        .await?;
    Ok(ApiResponse::message("Password updated successfully"))
}
