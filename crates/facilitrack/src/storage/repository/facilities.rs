use async_trait::async_trait;
use chrono::Utc;
use facilitrack_core::facility::{Facility, Membership, NewFacility, User};
use facilitrack_core::storage::{
    FacilityRepository, MembershipRepository, RepositoryError, Result,
};
use uuid::Uuid;

use super::{on_condition, TableRepository};
use crate::storage::conversions::{
    asset_added_on, facility_to_item, item_to_facility, item_to_membership, member_set_attribute,
    ASSETS,
};
use crate::storage::keys::{self, USER_PREFIX};
use crate::storage::store::{ItemUpdate, KeyQuery, PutCondition, SortCondition};

#[async_trait]
impl FacilityRepository for TableRepository {
    async fn insert_facility(&self, facility: &NewFacility) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let item = facility_to_item(&facility.clone().into_facility(id))?;

        self.store.put_item(item, PutCondition::Always).await?;

        tracing::debug!(facility_id = %id, name = %facility.name, "inserted facility");
        Ok(id)
    }

    async fn get_facility(&self, id: Uuid) -> Result<Facility> {
        let key = keys::facility_key(id)?;
        let item = self
            .query_one(KeyQuery::exact(&key), "Facility", id.to_string())
            .await?;
        item_to_facility(&item)
    }

    async fn add_user_to_facility(&self, user: &User, facility: &Facility) -> Result<Membership> {
        // The membership row grants access, so it is only written for a
        // facility that exists.
        self.get_facility(facility.id).await?;

        let membership = Membership::new(user, facility, Utc::now());
        self.insert_membership(&membership).await?;

        let update = ItemUpdate::AddToSet {
            attribute: member_set_attribute(user.role).to_string(),
            value: user.email.clone(),
        };
        self.store
            .update_item(&keys::facility_key(facility.id)?, &update)
            .await
            .map_err(|e| {
                on_condition(e, || {
                    RepositoryError::not_found("Facility", facility.id.to_string())
                })
            })?;

        tracing::debug!(
            facility_id = %facility.id,
            email = %user.email,
            role = %user.role,
            "added user to facility"
        );
        Ok(membership)
    }

    async fn remove_user_from_facility(&self, email: &str, facility_id: Uuid) -> Result<()> {
        self.get_facility(facility_id).await?;

        let membership = self
            .get_membership(email, facility_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound { .. } => RepositoryError::RelationshipMissing {
                    relation: "Membership",
                    id: format!("{email}/{facility_id}"),
                },
                e => e,
            })?;

        self.delete_membership(email, facility_id).await?;

        let update = ItemUpdate::RemoveFromSet {
            attribute: member_set_attribute(membership.user_role).to_string(),
            value: email.to_string(),
        };
        self.store
            .update_item(&keys::facility_key(facility_id)?, &update)
            .await
            .map_err(|e| {
                on_condition(e, || {
                    RepositoryError::not_found("Facility", facility_id.to_string())
                })
            })?;

        tracing::debug!(facility_id = %facility_id, email = %email, "removed user from facility");
        Ok(())
    }

    async fn list_users_for_facility(&self, facility_id: Uuid) -> Result<Vec<Membership>> {
        let query = KeyQuery::gsi1(
            keys::facility_partition(facility_id)?,
            SortCondition::BeginsWith(USER_PREFIX.to_string()),
        );

        let items = self.store.query(&query).await?;
        items.iter().map(item_to_membership).collect()
    }

    async fn add_asset_to_facility(&self, facility_id: Uuid, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(RepositoryError::not_found("Asset", name));
        }
        self.get_facility(facility_id).await?;

        let update = ItemUpdate::InsertMapEntry {
            attribute: ASSETS.to_string(),
            key: name.to_string(),
            value: asset_added_on(Utc::now()),
        };

        self.store
            .update_item(&keys::facility_key(facility_id)?, &update)
            .await
            .map_err(|e| on_condition(e, || RepositoryError::duplicate("Asset", name)))?;

        tracing::debug!(facility_id = %facility_id, asset = %name, "added asset");
        Ok(())
    }

    async fn remove_asset_from_facility(&self, facility_id: Uuid, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(RepositoryError::not_found("Asset", name));
        }
        self.get_facility(facility_id).await?;

        let update = ItemUpdate::RemoveMapEntry {
            attribute: ASSETS.to_string(),
            key: name.to_string(),
        };

        self.store
            .update_item(&keys::facility_key(facility_id)?, &update)
            .await
            .map_err(|e| {
                on_condition(e, || RepositoryError::RelationshipMissing {
                    relation: "Asset",
                    id: name.to_string(),
                })
            })?;

        tracing::debug!(facility_id = %facility_id, asset = %name, "removed asset");
        Ok(())
    }
}
