use super::ApiError;

/// Pull a required text field out of an assembled form, rejecting absent
/// or blank values. The raw value is otherwise passed through untouched.
pub fn require_field(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::validation(format!("{field} is required"))),
    }
}
