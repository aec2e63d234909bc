use facilitrack_core::authz::{require_task_deletion, Principal};
use facilitrack_core::facility::{validate_task, NewTask, Task, TaskDetails, TaskStatus};
use uuid::Uuid;

use super::access::require_membership;
use super::{FacilityService, Result};

impl FacilityService {
    /// Creates a task authored by the caller.
    ///
    /// The submitted status is ignored: a task starts `In progress` when it
    /// has an assignee and `Unassigned` otherwise.
    pub async fn create_task(
        &self,
        principal: &Principal,
        facility_id: Uuid,
        space_id: Uuid,
        details: TaskDetails,
    ) -> Result<Task> {
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;

        let mut details = details.normalized();
        details.status = TaskStatus::initial(details.assignee.as_deref());

        let facility = self.facilities.get_facility(facility_id).await?;
        validate_task(&details, &facility)?;
        self.spaces.get_space(facility_id, space_id).await?;

        let draft = NewTask {
            facility_id,
            space_id,
            creator: principal.email.clone(),
            details,
        };
        let id = self.tasks.insert_task(&draft).await?;
        Ok(draft.into_task(id))
    }

    /// Replaces every editable field of a task. The creator never changes.
    pub async fn edit_task(
        &self,
        principal: &Principal,
        facility_id: Uuid,
        space_id: Uuid,
        task_id: Uuid,
        details: TaskDetails,
    ) -> Result<Task> {
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;

        let details = details.normalized();
        let facility = self.facilities.get_facility(facility_id).await?;
        validate_task(&details, &facility)?;
        self.tasks.get_task(facility_id, space_id, task_id).await?;

        Ok(self
            .tasks
            .update_task(facility_id, space_id, task_id, &details)
            .await?)
    }

    /// Deletes a task and its comments. Owners may delete any task, others
    /// only their own.
    pub async fn delete_task(
        &self,
        principal: &Principal,
        facility_id: Uuid,
        space_id: Uuid,
        task_id: Uuid,
    ) -> Result<()> {
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;

        let task = self.tasks.get_task(facility_id, space_id, task_id).await?;
        require_task_deletion(principal, &task).inspect_err(|_| {
            tracing::warn!(
                task_id = %task_id,
                email = %principal.email,
                "Authorization denied: not the task creator"
            );
        })?;

        self.tasks.delete_task(facility_id, space_id, task_id).await?;
        tracing::info!(task_id = %task_id, "deleted task");
        Ok(())
    }

    pub async fn get_task(
        &self,
        principal: &Principal,
        facility_id: Uuid,
        space_id: Uuid,
        task_id: Uuid,
    ) -> Result<Task> {
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;
        Ok(self.tasks.get_task(facility_id, space_id, task_id).await?)
    }

    pub async fn list_tasks_for_space(
        &self,
        principal: &Principal,
        facility_id: Uuid,
        space_id: Uuid,
    ) -> Result<Vec<Task>> {
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;
        Ok(self.tasks.list_tasks_for_space(facility_id, space_id).await?)
    }

    pub async fn list_tasks_for_facility(
        &self,
        principal: &Principal,
        facility_id: Uuid,
    ) -> Result<Vec<Task>> {
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;
        Ok(self.tasks.list_tasks_for_facility(facility_id).await?)
    }
}
