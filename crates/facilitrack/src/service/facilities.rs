use std::collections::BTreeSet;

use chrono::Utc;
use facilitrack_core::authz::Principal;
use facilitrack_core::facility::{
    validate_asset_name, validate_new_facility, Facility, Membership, NewFacility,
};
use serde::Deserialize;
use uuid::Uuid;

use super::access::{require_membership, require_owner};
use super::{FacilityService, Result};

/// Caller-supplied facility fields. The image is already uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityInput {
    pub name: String,
    pub address: String,
    pub city: String,
    pub image_url: String,
}

impl FacilityService {
    /// Creates a facility owned by the caller, who becomes its first member.
    pub async fn create_facility(
        &self,
        principal: &Principal,
        input: FacilityInput,
    ) -> Result<Facility> {
        require_owner(principal)?;

        let draft = NewFacility {
            name: input.name,
            address: input.address,
            city: input.city,
            image_url: input.image_url,
            creator: principal.email.clone(),
            owners: BTreeSet::from([principal.email.clone()]),
            maintainers: BTreeSet::new(),
        };
        validate_new_facility(&draft)?;

        let creator = self.users.get_user(&principal.email).await?;
        let id = self.facilities.insert_facility(&draft).await?;
        let facility = draft.into_facility(id);

        // Owners already holds the creator, so only the membership row is written.
        self.memberships
            .insert_membership(&Membership::new(&creator, &facility, Utc::now()))
            .await?;

        tracing::info!(facility_id = %id, creator = %principal.email, "created facility");
        Ok(facility)
    }

    pub async fn get_facility(&self, principal: &Principal, facility_id: Uuid) -> Result<Facility> {
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;
        Ok(self.facilities.get_facility(facility_id).await?)
    }

    /// Adds a registered user to the facility under the role they registered with.
    pub async fn add_user_to_facility(
        &self,
        principal: &Principal,
        facility_id: Uuid,
        email: &str,
    ) -> Result<Membership> {
        require_owner(principal)?;
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;

        let facility = self.facilities.get_facility(facility_id).await?;
        let user = self.users.get_user(email).await?;

        Ok(self.facilities.add_user_to_facility(&user, &facility).await?)
    }

    pub async fn remove_user_from_facility(
        &self,
        principal: &Principal,
        facility_id: Uuid,
        email: &str,
    ) -> Result<()> {
        require_owner(principal)?;
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;

        self.facilities.get_facility(facility_id).await?;
        Ok(self
            .facilities
            .remove_user_from_facility(email, facility_id)
            .await?)
    }

    pub async fn list_users_for_facility(
        &self,
        principal: &Principal,
        facility_id: Uuid,
    ) -> Result<Vec<Membership>> {
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;
        Ok(self.facilities.list_users_for_facility(facility_id).await?)
    }

    pub async fn add_asset(&self, principal: &Principal, facility_id: Uuid, name: &str) -> Result<()> {
        require_owner(principal)?;
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;
        validate_asset_name(name)?;

        self.facilities.get_facility(facility_id).await?;
        Ok(self.facilities.add_asset_to_facility(facility_id, name).await?)
    }

    pub async fn remove_asset(
        &self,
        principal: &Principal,
        facility_id: Uuid,
        name: &str,
    ) -> Result<()> {
        require_owner(principal)?;
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;
        validate_asset_name(name)?;

        self.facilities.get_facility(facility_id).await?;
        Ok(self
            .facilities
            .remove_asset_from_facility(facility_id, name)
            .await?)
    }
}
