use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::types::{AgeResultDto, UserDto};
use super::{ApiError, ApiResponse, AppState, session};
use crate::services::age;

/// GET /dashboard
/// Profile of the logged-in user, without any derived fields.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let current = session::current(&session).await?;

    let user = state
        .store()
        .get_user_by_id(current.user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load user: {e}")))?
        .ok_or_else(|| ApiError::not_found("User", current.user_id))?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// GET /result
/// Profile of the logged-in user plus the age derived from the stored
/// birthday. A birthday that does not parse yields `age: null` instead of
/// an error.
pub async fn result(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<AgeResultDto>>, ApiError> {
    let current = session::current(&session).await?;

    let user = state
        .store()
        .get_user_by_id(current.user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load user: {e}")))?
        .ok_or_else(|| ApiError::not_found("User", current.user_id))?;

    let age = age::current_age(&user.birthday);

    Ok(Json(ApiResponse::success(AgeResultDto {
        user: UserDto::from(user),
        age,
    })))
}
