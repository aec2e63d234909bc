use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The entity is absent, or an identifying parameter was empty.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    /// A uniqueness-bearing key was already taken.
    #[error("{entity_type} already exists: {id}")]
    Duplicate {
        entity_type: &'static str,
        id: String,
    },
    /// A relationship to remove does not exist.
    #[error("{relation} does not exist: {id}")]
    RelationshipMissing { relation: &'static str, id: String },
    /// The store timed out or failed in a way worth retrying.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn duplicate(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::not_found("Task", "abc-123");
        assert_eq!(error.to_string(), "Task not found: abc-123");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_repository_error_duplicate_display() {
        let error = RepositoryError::duplicate("Membership", "alice@x.com");
        assert_eq!(error.to_string(), "Membership already exists: alice@x.com");
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_repository_error_relationship_missing_display() {
        let error = RepositoryError::RelationshipMissing {
            relation: "Asset",
            id: "Pump-1".to_string(),
        };
        assert_eq!(error.to_string(), "Asset does not exist: Pump-1");
    }

    #[test]
    fn test_repository_error_store_unavailable_display() {
        let error = RepositoryError::StoreUnavailable("timed out after 3s".to_string());
        assert_eq!(error.to_string(), "Store unavailable: timed out after 3s");
    }
}
