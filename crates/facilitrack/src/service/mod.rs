//! Operations request handlers call.
//!
//! Every operation takes an already-authenticated [`Principal`]. Mutations
//! run the authorization checks, then validation, then existence checks of
//! parents, and only then touch a repository. A missing membership becomes
//! [`AuthzError::NotMember`](facilitrack_core::authz::AuthzError::NotMember)
//! here and nowhere else; repositories keep reporting `NotFound`.
//!
//! [`Principal`]: facilitrack_core::authz::Principal

mod access;
mod comments;
mod error;
mod facilities;
mod spaces;
mod tasks;
mod users;

use std::sync::Arc;

use facilitrack_core::storage::{
    CommentRepository, FacilityRepository, MembershipRepository, SpaceRepository, TaskRepository,
    UserRepository,
};

pub use error::{service_error_to_status_code, Result, ServiceError};
pub use facilities::FacilityInput;
pub use spaces::SpaceInput;

use crate::storage::store::ItemStore;
use crate::storage::TableRepository;

/// The facility tracker's operations over injected repositories.
#[derive(Clone)]
pub struct FacilityService {
    users: Arc<dyn UserRepository>,
    facilities: Arc<dyn FacilityRepository>,
    memberships: Arc<dyn MembershipRepository>,
    spaces: Arc<dyn SpaceRepository>,
    tasks: Arc<dyn TaskRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl FacilityService {
    /// Creates a service whose repositories all share `repository`.
    pub fn new(repository: TableRepository) -> Self {
        let repository = Arc::new(repository);
        Self {
            users: repository.clone(),
            facilities: repository.clone(),
            memberships: repository.clone(),
            spaces: repository.clone(),
            tasks: repository.clone(),
            comments: repository,
        }
    }

    /// Creates a service on top of a store.
    pub fn from_store(store: Arc<dyn ItemStore>) -> Self {
        Self::new(TableRepository::new(store))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use facilitrack_core::authz::Principal;
    use facilitrack_core::facility::{Facility, NewUser, Role, TaskDetails, TaskStatus};
    use uuid::Uuid;

    use super::{FacilityInput, FacilityService, SpaceInput};
    use crate::storage::InMemoryStore;

    pub const OWNER: &str = "bob@x.com";
    pub const MAINTAINER: &str = "alice@x.com";
    pub const OUTSIDER: &str = "mallory@x.com";
    pub const PASSWORD: &str = "correct horse";

    pub fn service() -> FacilityService {
        FacilityService::from_store(Arc::new(InMemoryStore::new()))
    }

    pub async fn register(service: &FacilityService, email: &str, role: Role) -> Principal {
        let user = service
            .register_user(NewUser {
                name: "Some Person".to_string(),
                email: email.to_string(),
                role,
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();
        Principal::from(&user)
    }

    pub fn facility_input() -> FacilityInput {
        FacilityInput {
            name: "Plant".to_string(),
            address: "1 Main Street".to_string(),
            city: "Springfield".to_string(),
            image_url: "https://img/plant.png".to_string(),
        }
    }

    pub fn space_input() -> SpaceInput {
        SpaceInput {
            name: "Boiler room".to_string(),
            location: "Basement level 2".to_string(),
            schema_url: "https://img/boiler.png".to_string(),
        }
    }

    pub fn task_details() -> TaskDetails {
        TaskDetails {
            title: "Fix the pump".to_string(),
            description: "Leaking seal".to_string(),
            start_date: "2024-06-01T08:00:00Z".to_string(),
            end_date: "2024-06-02T08:00:00Z".to_string(),
            coord_x: "12.5".to_string(),
            coord_y: "40".to_string(),
            status: TaskStatus::Completed,
            assignee: None,
            asset: None,
        }
    }

    /// An owner, a maintainer who is a member, and an outsider, around one
    /// facility with one space.
    pub struct World {
        pub service: FacilityService,
        pub owner: Principal,
        pub maintainer: Principal,
        pub outsider: Principal,
        pub facility: Facility,
        pub space_id: Uuid,
    }

    pub async fn world() -> World {
        let service = service();
        let owner = register(&service, OWNER, Role::Owner).await;
        let maintainer = register(&service, MAINTAINER, Role::Maintainer).await;
        let outsider = register(&service, OUTSIDER, Role::Maintainer).await;

        let facility = service
            .create_facility(&owner, facility_input())
            .await
            .unwrap();
        service
            .add_user_to_facility(&owner, facility.id, MAINTAINER)
            .await
            .unwrap();
        let space = service
            .create_space(&owner, facility.id, space_input())
            .await
            .unwrap();
        let facility = service.get_facility(&owner, facility.id).await.unwrap();

        World {
            service,
            owner,
            maintainer,
            outsider,
            facility,
            space_id: space.id,
        }
    }
}
