//! Draft entities handed to repository inserts.
//!
//! Repositories assign the identifier; everything else is decided by the
//! caller before the write.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::password::{PasswordError, PasswordHash};
use super::types::{Comment, Facility, Role, Space, Task, TaskDetails, User};

/// Registration input. `password` is plaintext and only lives until hashed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

impl NewUser {
    /// Hashes the password and builds the stored user.
    pub fn into_user(self, created_at: DateTime<Utc>) -> Result<User, PasswordError> {
        Ok(User {
            password_hash: PasswordHash::generate(&self.password)?,
            email: self.email,
            name: self.name,
            role: self.role,
            created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFacility {
    pub name: String,
    pub address: String,
    pub city: String,
    pub image_url: String,
    pub creator: String,
    pub owners: BTreeSet<String>,
    pub maintainers: BTreeSet<String>,
}

impl NewFacility {
    /// Builds the stored facility. A new facility has no assets.
    pub fn into_facility(self, id: Uuid) -> Facility {
        Facility {
            id,
            name: self.name,
            address: self.address,
            city: self.city,
            image_url: self.image_url,
            creator: self.creator,
            owners: self.owners,
            maintainers: self.maintainers,
            assets: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSpace {
    pub facility_id: Uuid,
    pub name: String,
    pub location: String,
    pub schema_url: String,
}

impl NewSpace {
    pub fn into_space(self, id: Uuid) -> Space {
        Space {
            id,
            facility_id: self.facility_id,
            name: self.name,
            location: self.location,
            schema_url: self.schema_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub facility_id: Uuid,
    pub space_id: Uuid,
    pub creator: String,
    pub details: TaskDetails,
}

impl NewTask {
    pub fn into_task(self, id: Uuid) -> Task {
        Task {
            id,
            facility_id: self.facility_id,
            space_id: self.space_id,
            creator: self.creator,
            details: self.details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub facility_id: Uuid,
    pub space_id: Uuid,
    pub task_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_email: String,
    pub author_name: String,
}

impl NewComment {
    pub fn into_comment(self, id: Uuid) -> Comment {
        Comment {
            id,
            facility_id: self.facility_id,
            space_id: self.space_id,
            task_id: self.task_id,
            text: self.text,
            created_at: self.created_at,
            author_email: self.author_email,
            author_name: self.author_name,
        }
    }
}
