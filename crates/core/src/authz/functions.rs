use crate::facility::{Role, Task};

use super::{AuthzError, Principal};

/// Returns true when `role` is one of `permitted`.
pub fn is_role_permitted<R: PartialEq>(role: &R, permitted: &[R]) -> bool {
    permitted.contains(role)
}

/// Refuses callers whose role claim is not in `permitted`.
pub fn require_role(principal: &Principal, permitted: &[Role]) -> Result<(), AuthzError> {
    if is_role_permitted(&principal.role, permitted) {
        Ok(())
    } else {
        Err(AuthzError::RoleNotPermitted {
            role: principal.role,
        })
    }
}

/// Owners may delete any task; anyone else only the tasks they created.
pub fn can_delete_task(principal: &Principal, task: &Task) -> bool {
    principal.role.is_privileged() || principal.email == task.creator
}

pub fn require_task_deletion(principal: &Principal, task: &Task) -> Result<(), AuthzError> {
    if can_delete_task(principal, task) {
        Ok(())
    } else {
        Err(AuthzError::NotTaskCreator { task_id: task.id })
    }
}
