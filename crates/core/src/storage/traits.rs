use async_trait::async_trait;
use uuid::Uuid;

use crate::facility::{
    Comment, Facility, Membership, NewComment, NewFacility, NewSpace, NewTask, Space, Task,
    TaskDetails, User,
};

use super::Result;

/// Repository for user operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user. Fails with `Duplicate` if the email is taken.
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// Gets a user by email.
    async fn get_user(&self, email: &str) -> Result<User>;

    /// Lists the memberships of a user, one per facility they belong to.
    async fn list_facilities_for_user(&self, email: &str) -> Result<Vec<Membership>>;
}

/// Repository for facility operations, including its member sets and assets.
#[async_trait]
pub trait FacilityRepository: Send + Sync {
    /// Stores a new facility and returns its generated id.
    async fn insert_facility(&self, facility: &NewFacility) -> Result<Uuid>;

    /// Gets a facility by its ID.
    async fn get_facility(&self, id: Uuid) -> Result<Facility>;

    /// Writes the membership row and adds the user to the owner or
    /// maintainer set matching their role.
    ///
    /// Fails with `Duplicate` if the user is already a member.
    async fn add_user_to_facility(&self, user: &User, facility: &Facility) -> Result<Membership>;

    /// Deletes the membership row and removes the user from the matching set.
    ///
    /// Fails with `RelationshipMissing` if the user is not a member.
    async fn remove_user_from_facility(&self, email: &str, facility_id: Uuid) -> Result<()>;

    /// Lists the memberships of every user in a facility.
    async fn list_users_for_facility(&self, facility_id: Uuid) -> Result<Vec<Membership>>;

    /// Fails with `Duplicate` if the facility already has the asset.
    async fn add_asset_to_facility(&self, facility_id: Uuid, name: &str) -> Result<()>;

    /// Fails with `RelationshipMissing` if the facility lacks the asset.
    async fn remove_asset_from_facility(&self, facility_id: Uuid, name: &str) -> Result<()>;
}

/// Repository for the user/facility relationship rows.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Fails with `Duplicate` if the pair already has a row.
    async fn insert_membership(&self, membership: &Membership) -> Result<()>;

    async fn get_membership(&self, email: &str, facility_id: Uuid) -> Result<Membership>;

    async fn delete_membership(&self, email: &str, facility_id: Uuid) -> Result<()>;
}

/// Repository for space operations.
#[async_trait]
pub trait SpaceRepository: Send + Sync {
    async fn insert_space(&self, space: &NewSpace) -> Result<Uuid>;

    async fn get_space(&self, facility_id: Uuid, space_id: Uuid) -> Result<Space>;

    async fn list_spaces_for_facility(&self, facility_id: Uuid) -> Result<Vec<Space>>;
}

/// Repository for task operations.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert_task(&self, task: &NewTask) -> Result<Uuid>;

    async fn get_task(&self, facility_id: Uuid, space_id: Uuid, task_id: Uuid) -> Result<Task>;

    async fn list_tasks_for_space(&self, facility_id: Uuid, space_id: Uuid) -> Result<Vec<Task>>;

    /// Lists the tasks of every space in a facility.
    async fn list_tasks_for_facility(&self, facility_id: Uuid) -> Result<Vec<Task>>;

    /// Overwrites every editable field and returns the stored result.
    ///
    /// There is no version check: concurrent edits are last-write-wins.
    async fn update_task(
        &self,
        facility_id: Uuid,
        space_id: Uuid,
        task_id: Uuid,
        details: &TaskDetails,
    ) -> Result<Task>;

    /// Deletes the task together with its comments.
    ///
    /// Not atomic: a failure part way through can leave comment rows behind.
    async fn delete_task(&self, facility_id: Uuid, space_id: Uuid, task_id: Uuid) -> Result<()>;
}

/// Repository for comment operations.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert_comment(&self, comment: &NewComment) -> Result<Uuid>;

    async fn list_comments_for_task(
        &self,
        facility_id: Uuid,
        space_id: Uuid,
        task_id: Uuid,
    ) -> Result<Vec<Comment>>;
}
