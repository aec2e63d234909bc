mod error;
mod password;
mod requests;
mod types;
mod validation;

pub use error::{UnknownVariant, ValidationErrors};
pub use password::{PasswordError, PasswordHash};
pub use requests::{NewComment, NewFacility, NewSpace, NewTask, NewUser};
pub use types::{
    none_if_sentinel, Comment, Facility, Membership, Role, Space, Task, TaskDetails, TaskStatus,
    User, NO_ASSET, UNASSIGNED,
};
pub use validation::{
    is_valid_email, is_valid_timestamp, validate_asset_name, validate_new_comment,
    validate_new_facility, validate_new_space, validate_new_user, validate_password,
    validate_task,
};
