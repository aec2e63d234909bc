use async_trait::async_trait;
use facilitrack_core::facility::{NewSpace, Space};
use facilitrack_core::storage::{Result, SpaceRepository};
use uuid::Uuid;

use super::TableRepository;
use crate::storage::conversions::{item_to_space, space_to_item};
use crate::storage::keys::{self, SPACE_PREFIX};
use crate::storage::store::{KeyQuery, PutCondition, SortCondition};

#[async_trait]
impl SpaceRepository for TableRepository {
    async fn insert_space(&self, space: &NewSpace) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let item = space_to_item(&space.clone().into_space(id))?;

        self.store.put_item(item, PutCondition::Always).await?;

        tracing::debug!(facility_id = %space.facility_id, space_id = %id, "inserted space");
        Ok(id)
    }

    async fn get_space(&self, facility_id: Uuid, space_id: Uuid) -> Result<Space> {
        let key = keys::space_key(facility_id, space_id)?;
        let item = self
            .query_one(KeyQuery::exact(&key), "Space", space_id.to_string())
            .await?;
        item_to_space(&item)
    }

    async fn list_spaces_for_facility(&self, facility_id: Uuid) -> Result<Vec<Space>> {
        let query = KeyQuery::primary(
            keys::facility_partition(facility_id)?,
            SortCondition::BeginsWith(SPACE_PREFIX.to_string()),
        );

        let items = self.store.query(&query).await?;
        items.iter().map(item_to_space).collect()
    }
}
