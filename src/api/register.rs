use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;
use std::sync::Arc;

use super::validation::require_field;
use super::{ApiError, ApiResponse, AppState};
use crate::db::{NewUser, UserStoreError};
use crate::services::upload::{UploadError, UploadedFile};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Registration input assembled from the multipart form. Fields stay
/// optional until [`require_field`] has checked them.
#[derive(Debug, Default)]
struct RegistrationForm {
    name: Option<String>,
    birthday: Option<String>,
    address: Option<String>,
    username: Option<String>,
    password: Option<String>,
    profile_image: Option<UploadedFile>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user_id: i32,
    pub username: String,
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create a user from a multipart form with a profile image.
///
/// The image is stored before the record is inserted, so a failed insert
/// never leaves a user row pointing at a missing file. The reverse (a
/// stored file without a row, e.g. after a username conflict) is accepted.
pub async fn register(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<RegisterResponse>>, ApiError> {
    let form = read_form(&mut multipart).await?;

    let name = require_field(form.name, "name")?;
    let birthday = require_field(form.birthday, "birthday")?;
    let address = require_field(form.address, "address")?;
    let username = require_field(form.username, "username")?;
    let password = require_field(form.password, "password")?;

    let profile_image = state
        .uploads()
        .validate_and_store(form.profile_image.as_ref())
        .await
        .map_err(upload_error)?;

    let security = state.config().read().await.security.clone();

    let new_user = NewUser {
        name,
        birthday,
        address,
        username: username.clone(),
        password,
        profile_image: Some(profile_image),
    };

    let user_id = state
        .store()
        .create_user(new_user, &security)
        .await
        .map_err(|err| match err {
            UserStoreError::DuplicateUsername => {
                ApiError::conflict("Username is already taken")
            }
            UserStoreError::Database(e) => ApiError::DatabaseError(e.to_string()),
            UserStoreError::Internal(e) => {
                ApiError::internal(format!("Failed to create user: {e}"))
            }
        })?;

    tracing::info!(user_id, "User registered: {username}");

    Ok(Json(ApiResponse::success(RegisterResponse {
        user_id,
        username,
        message: "Registration successful! Please log in.".to_string(),
    })))
}

// ============================================================================
// Helpers
// ============================================================================

async fn read_form(multipart: &mut Multipart) -> Result<RegistrationForm, ApiError> {
    let mut form = RegistrationForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(field_name) = field.name().map(ToString::to_string) else {
            continue;
        };

        match field_name.as_str() {
            "profile_image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::validation(format!("Failed to read uploaded file: {e}"))
                })?;
                form.profile_image = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "name" => form.name = Some(read_text(field).await?),
            "birthday" => form.birthday = Some(read_text(field).await?),
            "address" => form.address = Some(read_text(field).await?),
            "username" => form.username = Some(read_text(field).await?),
            "password" => form.password = Some(read_text(field).await?),
            // Unknown fields are ignored
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation(format!("Failed to read form field: {e}")))
}

fn upload_error(err: UploadError) -> ApiError {
    match err {
        UploadError::MissingFile => ApiError::validation("No file part"),
        UploadError::InvalidExtension => {
            ApiError::validation("Invalid image format. Please upload a valid image.")
        }
        UploadError::UnsafeFilename => ApiError::validation("Invalid image file name"),
        UploadError::Io(e) => ApiError::internal(format!("Failed to store image: {e}")),
    }
}
