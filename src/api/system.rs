//! System API endpoints.
//!
//! Status monitoring for operators; the numbers come straight from the
//! store so the endpoint doubles as a database liveness probe.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};

/// Returns service health information.
///
/// # Endpoint
/// `GET /api/system/status`
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<super::SystemStatus>>, ApiError> {
    let registered_users = state
        .store()
        .user_count()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to count users: {e}")))?;

    Ok(Json(ApiResponse::success(super::SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        registered_users,
    })))
}
