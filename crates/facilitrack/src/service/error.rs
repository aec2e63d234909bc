use facilitrack_core::authz::AuthzError;
use facilitrack_core::facility::{PasswordError, ValidationErrors};
use facilitrack_core::storage::{repository_error_to_status_code, RepositoryError};
use thiserror::Error;

/// Why a service operation was refused or failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Every rule the input broke, not just the first.
    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationErrors),
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthzError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Maps a [`ServiceError`] to an HTTP status code.
///
/// - `ValidationFailed` -> 422 (Unprocessable Entity)
/// - `Unauthorized` -> 403 (Forbidden), 401 for bad credentials
/// - `Repository` -> see [`repository_error_to_status_code`]
/// - `Password` -> 500 (Internal Server Error)
pub fn service_error_to_status_code(error: &ServiceError) -> u16 {
    match error {
        ServiceError::ValidationFailed(_) => 422,
        ServiceError::Unauthorized(AuthzError::InvalidCredentials) => 401,
        ServiceError::Unauthorized(_) => 403,
        ServiceError::Repository(err) => repository_error_to_status_code(err),
        ServiceError::Password(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use facilitrack_core::facility::PasswordHash;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_status_codes() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Name is required");
        assert_eq!(service_error_to_status_code(&errors.into()), 422);

        let err = AuthzError::NotMember {
            facility_id: Uuid::new_v4(),
        };
        assert_eq!(service_error_to_status_code(&err.into()), 403);
        assert_eq!(
            service_error_to_status_code(&AuthzError::InvalidCredentials.into()),
            401
        );

        let err = RepositoryError::duplicate("Asset", "Pump-1");
        assert_eq!(service_error_to_status_code(&err.into()), 409);

        let err = PasswordHash::with_cost("pa55word", 2).unwrap_err();
        assert_eq!(service_error_to_status_code(&err.into()), 500);
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("city", "City is required");
        errors.add("address", "Address is required");

        let err = ServiceError::from(errors);

        assert_eq!(
            err.to_string(),
            "validation failed: address: Address is required; city: City is required"
        );
    }
}
