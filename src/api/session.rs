//! Typed access to the per-connection session record.
//!
//! Login state lives server-side in the session store; the browser only
//! ever holds the opaque session id cookie issued by the session layer.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::ApiError;

const SESSION_USER_KEY: &str = "user";

/// Payload stored in the session while a user is logged in. Absence of
/// this record is the anonymous state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: i32,
    pub username: String,
}

/// Associate the session with a logged-in user.
pub async fn establish(session: &Session, user: &SessionUser) -> Result<(), ApiError> {
    session
        .insert(SESSION_USER_KEY, user)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}

/// Current user from the session, or `Unauthorized` when anonymous.
pub async fn current(session: &Session) -> Result<SessionUser, ApiError> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Please log in to access this page.".to_string()))
}

/// Drop all session state, returning the connection to anonymous.
/// Clearing an already-anonymous session is a no-op.
pub async fn clear(session: &Session) {
    let _ = session.flush().await;
}
