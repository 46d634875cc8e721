//! Validation utilities for web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// The body is deserialized and then checked with the `validator` crate;
/// failures produce a 422 response with field-level details.
///
/// # Example
///
/// ```ignore
/// use storeit::web::dto::ValidatedJson;
///
/// async fn sign_in(
///     ValidatedJson(payload): ValidatedJson<SignInRequest>,
/// ) -> Result<Json<ApiResponse<AccountId>>, ApiError> {
///     // payload.email is a valid address
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate that a string does not contain control characters or NULL bytes.
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value.chars().any(|c| c.is_control()) {
        return Err(validator::ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

/// Validate a full name: no control characters and 2 to 50 characters
/// once surrounding whitespace is removed.
pub fn valid_full_name(value: &str) -> Result<(), validator::ValidationError> {
    no_control_chars(value)?;
    let length = value.trim().chars().count();
    if !(2..=50).contains(&length) {
        return Err(validator::ValidationError::new("full_name_length")
            .with_message("Full name must be 2 to 50 characters".into()));
    }
    Ok(())
}

/// Validate that a string is not empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_empty_trimmed")
            .with_message("Must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_control_chars() {
        assert!(no_control_chars("Ada Lovelace").is_ok());
        assert!(no_control_chars("Ada\x00").is_err());
        assert!(no_control_chars("Ada\nLovelace").is_err());
    }

    #[test]
    fn test_valid_full_name() {
        assert!(valid_full_name("Ada Lovelace").is_ok());
        assert!(valid_full_name("  Al  ").is_ok());
        assert!(valid_full_name(" A ").is_err());
        assert!(valid_full_name(&"x".repeat(51)).is_err());
        assert!(valid_full_name("Ada\tLovelace").is_err());
    }

    #[test]
    fn test_not_empty_trimmed() {
        assert!(not_empty_trimmed("acc1").is_ok());
        assert!(not_empty_trimmed("").is_err());
        assert!(not_empty_trimmed("   ").is_err());
    }
}
