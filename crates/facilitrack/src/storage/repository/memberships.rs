use async_trait::async_trait;
use facilitrack_core::facility::Membership;
use facilitrack_core::storage::{MembershipRepository, RepositoryError, Result};
use uuid::Uuid;

use super::{on_condition, TableRepository};
use crate::storage::conversions::{item_to_membership, membership_to_item};
use crate::storage::keys;
use crate::storage::store::{KeyQuery, PutCondition};

#[async_trait]
impl MembershipRepository for TableRepository {
    async fn insert_membership(&self, membership: &Membership) -> Result<()> {
        let item = membership_to_item(membership)?;

        self.store
            .put_item(item, PutCondition::KeyAbsent)
            .await
            .map_err(|e| {
                on_condition(e, || {
                    RepositoryError::duplicate(
                        "Membership",
                        format!("{}/{}", membership.user_email, membership.facility_id),
                    )
                })
            })
    }

    async fn get_membership(&self, email: &str, facility_id: Uuid) -> Result<Membership> {
        let key = keys::membership_key(email, facility_id)?;
        let item = self
            .query_one(
                KeyQuery::exact(&key),
                "Membership",
                format!("{email}/{facility_id}"),
            )
            .await?;
        item_to_membership(&item)
    }

    async fn delete_membership(&self, email: &str, facility_id: Uuid) -> Result<()> {
        let key = keys::membership_key(email, facility_id)?;
        self.store.delete_item(&key).await?;
        Ok(())
    }
}
