use async_trait::async_trait;
use facilitrack_core::facility::{NewTask, Task, TaskDetails};
use facilitrack_core::storage::{RepositoryError, Result, TaskRepository};
use uuid::Uuid;

use super::{on_condition, TableRepository};
use crate::storage::conversions::{item_to_task, task_details_attributes, task_to_item};
use crate::storage::keys::{self, decode_sort_key, SortKey, TASK_PREFIX};
use crate::storage::store::{
    Item, ItemUpdate, KeyPair, KeyQuery, PutCondition, SortCondition, StoreError, SK,
};

fn is_task_row(item: &Item) -> bool {
    item.get(SK)
        .and_then(|sk| sk.as_s())
        .and_then(decode_sort_key)
        .is_some_and(|key| matches!(key, SortKey::Task(_)))
}

#[async_trait]
impl TaskRepository for TableRepository {
    async fn insert_task(&self, task: &NewTask) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let item = task_to_item(&task.clone().into_task(id))?;

        self.store.put_item(item, PutCondition::Always).await?;

        tracing::debug!(
            facility_id = %task.facility_id,
            space_id = %task.space_id,
            task_id = %id,
            "inserted task"
        );
        Ok(id)
    }

    async fn get_task(&self, facility_id: Uuid, space_id: Uuid, task_id: Uuid) -> Result<Task> {
        let key = keys::task_key(facility_id, space_id, task_id)?;
        let item = self
            .query_one(KeyQuery::exact(&key), "Task", task_id.to_string())
            .await?;
        item_to_task(&item)
    }

    async fn list_tasks_for_space(&self, facility_id: Uuid, space_id: Uuid) -> Result<Vec<Task>> {
        let query = KeyQuery::primary(
            keys::task_partition(facility_id, space_id)?,
            SortCondition::BeginsWith(TASK_PREFIX.to_string()),
        );

        // Comments share the partition and prefix.
        let items = self.store.query(&query).await?;
        items
            .iter()
            .filter(|item| is_task_row(item))
            .map(item_to_task)
            .collect()
    }

    async fn list_tasks_for_facility(&self, facility_id: Uuid) -> Result<Vec<Task>> {
        let query = KeyQuery::gsi1(
            keys::facility_partition(facility_id)?,
            SortCondition::BeginsWith(TASK_PREFIX.to_string()),
        );

        let items = self.store.query(&query).await?;
        items.iter().map(item_to_task).collect()
    }

    async fn update_task(
        &self,
        facility_id: Uuid,
        space_id: Uuid,
        task_id: Uuid,
        details: &TaskDetails,
    ) -> Result<Task> {
        let key = keys::task_key(facility_id, space_id, task_id)?;
        let update = ItemUpdate::Set(task_details_attributes(details));

        let item = self
            .store
            .update_item(&key, &update)
            .await
            .map_err(|e| on_condition(e, || RepositoryError::not_found("Task", task_id.to_string())))?;

        tracing::debug!(task_id = %task_id, status = %details.status, "updated task");
        item_to_task(&item)
    }

    async fn delete_task(&self, facility_id: Uuid, space_id: Uuid, task_id: Uuid) -> Result<()> {
        let query = KeyQuery::primary(
            keys::task_partition(facility_id, space_id)?,
            SortCondition::BeginsWith(keys::task_sort_prefix(task_id)?),
        );

        let items = self.store.query(&query).await?;
        if !items.iter().any(is_task_row) {
            return Err(RepositoryError::not_found("Task", task_id.to_string()));
        }

        let keys = items
            .iter()
            .map(|item| {
                KeyPair::from_item(item)
                    .ok_or_else(|| StoreError::Malformed("item without primary key".to_string()))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Not atomic; a failure part way leaves some comments behind.
        self.store.batch_delete(&keys).await?;

        tracing::debug!(task_id = %task_id, removed = keys.len(), "deleted task");
        Ok(())
    }
}
