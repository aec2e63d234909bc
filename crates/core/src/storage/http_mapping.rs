//! Pure functions for mapping repository errors to HTTP status codes.
//!
//! Repositories never pick a response code themselves; request handlers use
//! this mapping at the transport boundary.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `Duplicate` -> 409 (Conflict)
/// - `RelationshipMissing` -> 404 (Not Found)
/// - `StoreUnavailable` -> 503 (Service Unavailable)
/// - `QueryFailed` -> 500 (Internal Server Error)
/// - `Serialization` -> 500 (Internal Server Error)
/// - `InvalidData` -> 400 (Bad Request)
///
/// # Examples
///
/// ```
/// use facilitrack_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Facility",
///     id: "abc-123".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::Duplicate { .. } => 409,
        RepositoryError::RelationshipMissing { .. } => 404,
        RepositoryError::StoreUnavailable(_) => 503,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::Serialization(_) => 500,
        RepositoryError::InvalidData(_) => 400,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let error = RepositoryError::not_found("Facility", "fac-123");
        assert_eq!(repository_error_to_status_code(&error), 404);
    }

    #[test]
    fn test_duplicate_maps_to_409() {
        let error = RepositoryError::duplicate("User", "alice@x.com");
        assert_eq!(repository_error_to_status_code(&error), 409);
    }

    #[test]
    fn test_relationship_missing_maps_to_404() {
        let error = RepositoryError::RelationshipMissing {
            relation: "Membership",
            id: "alice@x.com".to_string(),
        };
        assert_eq!(repository_error_to_status_code(&error), 404);
    }

    #[test]
    fn test_store_unavailable_maps_to_503() {
        let error = RepositoryError::StoreUnavailable("timed out".to_string());
        assert_eq!(repository_error_to_status_code(&error), 503);
    }

    #[test]
    fn test_internal_failures_map_to_500() {
        let query = RepositoryError::QueryFailed("Table not found".to_string());
        let serialization = RepositoryError::Serialization("bad map".to_string());
        assert_eq!(repository_error_to_status_code(&query), 500);
        assert_eq!(repository_error_to_status_code(&serialization), 500);
    }

    #[test]
    fn test_invalid_data_maps_to_400() {
        let error = RepositoryError::InvalidData("missing attribute".to_string());
        assert_eq!(repository_error_to_status_code(&error), 400);
    }
}
