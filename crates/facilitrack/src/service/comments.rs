use chrono::Utc;
use facilitrack_core::authz::Principal;
use facilitrack_core::facility::{validate_new_comment, Comment, NewComment};
use uuid::Uuid;

use super::access::require_membership;
use super::{FacilityService, Result};

impl FacilityService {
    /// Comments on a task as the caller.
    pub async fn add_comment(
        &self,
        principal: &Principal,
        facility_id: Uuid,
        space_id: Uuid,
        task_id: Uuid,
        text: &str,
    ) -> Result<Comment> {
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;

        let draft = NewComment {
            facility_id,
            space_id,
            task_id,
            text: text.to_string(),
            created_at: Utc::now(),
            author_email: principal.email.clone(),
            author_name: principal.name.clone(),
        };
        validate_new_comment(&draft)?;

        self.tasks.get_task(facility_id, space_id, task_id).await?;
        let id = self.comments.insert_comment(&draft).await?;
        Ok(draft.into_comment(id))
    }

    pub async fn list_comments(
        &self,
        principal: &Principal,
        facility_id: Uuid,
        space_id: Uuid,
        task_id: Uuid,
    ) -> Result<Vec<Comment>> {
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;
        Ok(self
            .comments
            .list_comments_for_task(facility_id, space_id, task_id)
            .await?)
    }
}
