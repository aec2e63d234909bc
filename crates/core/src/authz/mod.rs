//! Authorization decisions.
//!
//! Everything here is pure. Whether a caller is a member of a facility is a
//! storage lookup and is answered by the service layer, which turns a missing
//! membership into [`AuthzError::NotMember`].

mod error;
mod functions;
mod types;

pub use error::AuthzError;
pub use functions::{can_delete_task, is_role_permitted, require_role, require_task_deletion};
pub use types::Principal;
