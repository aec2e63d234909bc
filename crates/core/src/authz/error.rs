use thiserror::Error;
use uuid::Uuid;

use crate::facility::Role;

/// Why a caller was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The caller has no membership in the facility.
    #[error("no access to facility {facility_id}")]
    NotMember { facility_id: Uuid },
    /// The caller's role is not among those allowed for the operation.
    #[error("role {role} is not permitted to perform this operation")]
    RoleNotPermitted { role: Role },
    /// Only the task's creator or an owner may do this.
    #[error("only the creator or an owner may modify task {task_id}")]
    NotTaskCreator { task_id: Uuid },
    #[error("invalid email or password")]
    InvalidCredentials,
}
