use facilitrack_core::authz::Principal;
use facilitrack_core::facility::{validate_new_space, NewSpace, Space};
use serde::Deserialize;
use uuid::Uuid;

use super::access::{require_membership, require_owner};
use super::{FacilityService, Result};

/// Caller-supplied space fields. The blueprint is already uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceInput {
    pub name: String,
    pub location: String,
    pub schema_url: String,
}

impl FacilityService {
    pub async fn create_space(
        &self,
        principal: &Principal,
        facility_id: Uuid,
        input: SpaceInput,
    ) -> Result<Space> {
        require_owner(principal)?;
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;

        let draft = NewSpace {
            facility_id,
            name: input.name,
            location: input.location,
            schema_url: input.schema_url,
        };
        validate_new_space(&draft)?;

        self.facilities.get_facility(facility_id).await?;
        let id = self.spaces.insert_space(&draft).await?;
        Ok(draft.into_space(id))
    }

    pub async fn get_space(
        &self,
        principal: &Principal,
        facility_id: Uuid,
        space_id: Uuid,
    ) -> Result<Space> {
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;
        Ok(self.spaces.get_space(facility_id, space_id).await?)
    }

    pub async fn list_spaces(&self, principal: &Principal, facility_id: Uuid) -> Result<Vec<Space>> {
        require_membership(self.memberships.as_ref(), principal, facility_id).await?;
        Ok(self.spaces.list_spaces_for_facility(facility_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use facilitrack_core::authz::AuthzError;
    use facilitrack_core::storage::RepositoryError;

    use super::*;
    use crate::service::test_support::{space_input, world};
    use crate::service::ServiceError;

    #[tokio::test]
    async fn test_create_then_get_space() {
        let world = world().await;

        let space = world
            .service
            .create_space(&world.owner, world.facility.id, space_input())
            .await
            .unwrap();

        let stored = world
            .service
            .get_space(&world.maintainer, world.facility.id, space.id)
            .await
            .unwrap();
        assert_eq!(stored, space);
        assert_eq!(stored.name, "Boiler room");
    }

    #[tokio::test]
    async fn test_list_spaces() {
        let world = world().await;
        world
            .service
            .create_space(&world.owner, world.facility.id, space_input())
            .await
            .unwrap();

        let spaces = world
            .service
            .list_spaces(&world.maintainer, world.facility.id)
            .await
            .unwrap();

        assert_eq!(spaces.len(), 2);
        assert!(spaces.iter().any(|s| s.id == world.space_id));
    }

    #[tokio::test]
    async fn test_maintainer_cannot_create_space() {
        let world = world().await;

        let result = world
            .service
            .create_space(&world.maintainer, world.facility.id, space_input())
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Unauthorized(
                AuthzError::RoleNotPermitted { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_invalid_space_is_rejected_before_write() {
        let world = world().await;

        let result = world
            .service
            .create_space(
                &world.owner,
                world.facility.id,
                SpaceInput {
                    name: "B".to_string(),
                    location: "Attic".to_string(),
                    schema_url: String::new(),
                },
            )
            .await;

        let Err(ServiceError::ValidationFailed(errors)) = result else {
            panic!("expected validation failure, got {result:?}");
        };
        assert!(errors.contains("name"));
        assert!(errors.contains("location"));
        let spaces = world
            .service
            .list_spaces(&world.owner, world.facility.id)
            .await
            .unwrap();
        assert_eq!(spaces.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_space_is_not_found() {
        let world = world().await;

        let result = world
            .service
            .get_space(&world.owner, world.facility.id, Uuid::new_v4())
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Repository(RepositoryError::NotFound {
                entity_type: "Space",
                ..
            }))
        ));
    }
}
