use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::session::{self, SessionUser};
use super::{ApiError, ApiResponse, AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user_id: i32,
    pub username: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Guards the protected routes: requests without a logged-in session are
/// rejected with 401 before the handler runs.
pub async fn auth_middleware(
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let user = session::current(&session).await?;
    tracing::Span::current().record("user_id", user.user_id);

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Authenticate with username and password, establishes a session on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    // Validate input
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    // Verify credentials against database. An unknown username takes the
    // same rejection path as a wrong password.
    let is_valid = state
        .store()
        .verify_user_password(&payload.username, &payload.password)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?;

    if !is_valid {
        return Err(ApiError::Unauthorized(
            "Invalid credentials. Please try again.".to_string(),
        ));
    }

    let user = state
        .store()
        .get_user_by_username(&payload.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| {
            ApiError::Unauthorized("Invalid credentials. Please try again.".to_string())
        })?;

    session::establish(
        &session,
        &SessionUser {
            user_id: user.id,
            username: user.username.clone(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User logged in: {}", user.username);

    Ok(Json(ApiResponse::success(LoginResponse {
        user_id: user.id,
        username: user.username,
    })))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> impl IntoResponse {
    session::clear(&session).await;
    (StatusCode::OK, "Logged out")
}
