//! Repository implementation over an [`ItemStore`].
//!
//! One struct implements every repository trait from
//! `facilitrack_core::storage`. Keys come from [`keys`](super::keys) and
//! items from [`conversions`](super::conversions); the store is injected at
//! construction.

mod comments;
mod facilities;
mod memberships;
mod spaces;
mod tasks;
mod users;

use std::sync::Arc;

use facilitrack_core::storage::{RepositoryError, Result};

use super::store::{Item, ItemStore, KeyQuery, StoreError};

/// Single-table repository.
#[derive(Clone)]
pub struct TableRepository {
    store: Arc<dyn ItemStore>,
}

impl TableRepository {
    /// Creates a repository on top of the given store.
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Runs an exact-key query and returns the single match.
    async fn query_one(&self, query: KeyQuery, entity_type: &'static str, id: String) -> Result<Item> {
        self.store
            .query(&query)
            .await?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound { entity_type, id })
    }
}

/// Maps a store error, giving a failed condition the meaning the calling
/// operation assigns to it.
fn on_condition(err: StoreError, meaning: impl FnOnce() -> RepositoryError) -> RepositoryError {
    match err {
        StoreError::ConditionFailed => meaning(),
        err => err.into(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use chrono::Utc;
    use facilitrack_core::facility::{
        NewFacility, NewSpace, NewTask, PasswordHash, Role, TaskDetails, TaskStatus, User,
    };
    use uuid::Uuid;

    use super::TableRepository;
    use crate::storage::inmemory::InMemoryStore;

    pub fn repository() -> (TableRepository, InMemoryStore) {
        let store = InMemoryStore::new();
        (TableRepository::new(Arc::new(store.clone())), store)
    }

    pub fn user(email: &str, role: Role) -> User {
        User {
            email: email.to_string(),
            name: "Some One".to_string(),
            role,
            password_hash: PasswordHash::with_cost("pa55word", 4).unwrap(),
            created_at: Utc::now(),
        }
    }

    pub fn new_facility() -> NewFacility {
        NewFacility {
            name: "Plant".to_string(),
            address: "1 Main Street".to_string(),
            city: "Springfield".to_string(),
            image_url: "https://img/plant.png".to_string(),
            creator: "bob@x.com".to_string(),
            owners: BTreeSet::from(["bob@x.com".to_string()]),
            maintainers: BTreeSet::new(),
        }
    }

    pub fn new_space(facility_id: Uuid) -> NewSpace {
        NewSpace {
            facility_id,
            name: "Boiler room".to_string(),
            location: "Basement level 2".to_string(),
            schema_url: "https://img/boiler.png".to_string(),
        }
    }

    pub fn details() -> TaskDetails {
        TaskDetails {
            title: "Fix the pump".to_string(),
            description: "Leaking seal".to_string(),
            start_date: "2024-06-01T08:00:00Z".to_string(),
            end_date: "2024-06-02T08:00:00Z".to_string(),
            coord_x: "12.5".to_string(),
            coord_y: "40".to_string(),
            status: TaskStatus::Unassigned,
            assignee: None,
            asset: None,
        }
    }

    pub fn new_task(facility_id: Uuid, space_id: Uuid) -> NewTask {
        NewTask {
            facility_id,
            space_id,
            creator: "bob@x.com".to_string(),
            details: details(),
        }
    }
}
