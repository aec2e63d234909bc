use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::UnknownVariant;
use super::password::PasswordHash;

/// Persisted assignee value of a task nobody works on.
pub const UNASSIGNED: &str = "Unassigned";

/// Persisted asset value of a task not tied to an asset.
pub const NO_ASSET: &str = "None";

/// Role a user holds in every facility they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Maintainer,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Owner, Role::Maintainer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Maintainer => "Maintainer",
        }
    }

    /// Owners manage facilities, their spaces, assets and members.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Owner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("role", s))
    }
}

/// Lifecycle of a maintenance task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "Unassigned")]
    Unassigned,
    #[serde(rename = "In progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Unassigned,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Unassigned => "Unassigned",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Status a freshly created task starts in.
    pub fn initial(assignee: Option<&str>) -> Self {
        match assignee {
            Some(_) => TaskStatus::InProgress,
            None => TaskStatus::Unassigned,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("task status", s))
    }
}

/// A registered user. The email is the identity key and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip)]
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
}

/// A managed site. Top-level tenant boundary for spaces, tasks and assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub image_url: String,
    pub creator: String,
    pub owners: BTreeSet<String>,
    pub maintainers: BTreeSet<String>,
    /// Asset name to the moment it was added.
    pub assets: BTreeMap<String, DateTime<Utc>>,
}

impl Facility {
    /// The member set a user with `role` is folded into.
    pub fn members_with_role(&self, role: Role) -> &BTreeSet<String> {
        match role {
            Role::Owner => &self.owners,
            Role::Maintainer => &self.maintainers,
        }
    }

    pub fn is_maintainer(&self, email: &str) -> bool {
        self.maintainers.contains(email)
    }

    pub fn has_asset(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }
}

/// A zone inside a facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub name: String,
    pub location: String,
    pub schema_url: String,
}

/// The caller-editable part of a task. An edit replaces all of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub start_date: String,
    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub end_date: String,
    pub coord_x: String,
    pub coord_y: String,
    pub status: TaskStatus,
    pub assignee: Option<String>,
    pub asset: Option<String>,
}

impl TaskDetails {
    /// Folds blank values and the persisted sentinels into `None`.
    pub fn normalized(mut self) -> Self {
        self.assignee = none_if_sentinel(self.assignee, UNASSIGNED);
        self.asset = none_if_sentinel(self.asset, NO_ASSET);
        self
    }
}

/// `None` for a blank value or the given sentinel.
pub fn none_if_sentinel(value: Option<String>, sentinel: &str) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != sentinel)
}

/// A maintenance work item placed inside a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub space_id: Uuid,
    pub creator: String,
    #[serde(flatten)]
    pub details: TaskDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub space_id: Uuid,
    pub task_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_email: String,
    pub author_name: String,
}

/// A user's membership in a facility.
///
/// Carries copies of the facility and user summary fields so both
/// "facilities of a user" and "users of a facility" can be listed without
/// further lookups. The copies are taken when the membership is written and
/// are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user_email: String,
    pub user_name: String,
    pub user_role: Role,
    pub added_on: DateTime<Utc>,
    pub facility_id: Uuid,
    pub facility_name: String,
    pub facility_address: String,
    pub facility_city: String,
    pub facility_image_url: String,
}

impl Membership {
    pub fn new(user: &User, facility: &Facility, added_on: DateTime<Utc>) -> Self {
        Self {
            user_email: user.email.clone(),
            user_name: user.name.clone(),
            user_role: user.role,
            added_on,
            facility_id: facility.id,
            facility_name: facility.name.clone(),
            facility_address: facility.address.clone(),
            facility_city: facility.city.clone(),
            facility_image_url: facility.image_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_only_owner_is_privileged() {
        assert!(Role::Owner.is_privileged());
        assert!(!Role::Maintainer.is_privileged());
    }

    #[test]
    fn test_task_status_uses_display_strings() {
        assert_eq!(TaskStatus::InProgress.to_string(), "In progress");
        assert_eq!(
            "In progress".parse::<TaskStatus>().unwrap(),
            TaskStatus::InProgress
        );
        assert!("InProgress".parse::<TaskStatus>().is_err());

        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In progress\"");
    }

    #[test]
    fn test_initial_status_follows_assignee() {
        assert_eq!(TaskStatus::initial(None), TaskStatus::Unassigned);
        assert_eq!(
            TaskStatus::initial(Some("alice@x.com")),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn test_normalized_folds_sentinels() {
        let details = TaskDetails {
            title: "Fix the pump".to_string(),
            description: String::new(),
            start_date: "2024-06-01T08:00:00Z".to_string(),
            end_date: "2024-06-02T08:00:00Z".to_string(),
            coord_x: "10".to_string(),
            coord_y: "20".to_string(),
            status: TaskStatus::Unassigned,
            assignee: Some(UNASSIGNED.to_string()),
            asset: Some("  ".to_string()),
        }
        .normalized();

        assert_eq!(details.assignee, None);
        assert_eq!(details.asset, None);
        assert_eq!(
            none_if_sentinel(Some("Pump-1".to_string()), NO_ASSET),
            Some("Pump-1".to_string())
        );
    }

    #[test]
    fn test_user_serialization_skips_password_hash() {
        let user = User {
            email: "alice@x.com".to_string(),
            name: "Alice Smith".to_string(),
            role: Role::Maintainer,
            password_hash: PasswordHash::with_cost("correct horse", 4).unwrap(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "Maintainer");
    }

    #[test]
    fn test_membership_copies_summary_fields() {
        let user = User {
            email: "bob@x.com".to_string(),
            name: "Bob Jones".to_string(),
            role: Role::Owner,
            password_hash: PasswordHash::default(),
            created_at: Utc::now(),
        };
        let facility = Facility {
            id: Uuid::new_v4(),
            name: "Plant".to_string(),
            address: "1 Main Street".to_string(),
            city: "Springfield".to_string(),
            image_url: "https://img/plant.png".to_string(),
            creator: "bob@x.com".to_string(),
            owners: BTreeSet::from(["bob@x.com".to_string()]),
            maintainers: BTreeSet::new(),
            assets: BTreeMap::new(),
        };
        let now = Utc::now();

        let membership = Membership::new(&user, &facility, now);

        assert_eq!(membership.user_role, Role::Owner);
        assert_eq!(membership.facility_id, facility.id);
        assert_eq!(membership.facility_city, "Springfield");
        assert_eq!(membership.added_on, now);
    }
}
