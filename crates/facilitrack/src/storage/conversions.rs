//! Item conversion functions.
//!
//! Pure functions converting between store items and domain types. Attribute
//! names match the layout already present in deployed tables.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use facilitrack_core::facility::{
    none_if_sentinel, Comment, Facility, Membership, PasswordHash, Role, Space, Task, TaskDetails,
    TaskStatus, User, NO_ASSET, UNASSIGNED,
};
use facilitrack_core::storage::{RepositoryError, Result};
use uuid::Uuid;

use super::keys;
use super::store::{Attribute, Item, KeyPair, GSI1PK, GSI1SK, PK, SK};

// ============================================================================
// Entity type constants
// ============================================================================

pub const ENTITY_TYPE: &str = "EntityType";
pub const ENTITY_TYPE_USER: &str = "USER";
pub const ENTITY_TYPE_FACILITY: &str = "FACILITY";
pub const ENTITY_TYPE_SPACE: &str = "SPACE";
pub const ENTITY_TYPE_TASK: &str = "TASK";
pub const ENTITY_TYPE_COMMENT: &str = "COMMENT";
pub const ENTITY_TYPE_MEMBERSHIP: &str = "MEMBERSHIP";

pub const OWNERS: &str = "Owners";
pub const MAINTAINERS: &str = "Maintainers";
pub const ASSETS: &str = "Assets";

/// The facility set a member with `role` belongs to.
pub fn member_set_attribute(role: Role) -> &'static str {
    match role {
        Role::Owner => OWNERS,
        Role::Maintainer => MAINTAINERS,
    }
}

fn s(value: impl Into<String>) -> Attribute {
    Attribute::S(value.into())
}

fn new_item(key: KeyPair, entity_type: &str) -> Item {
    let mut item = Item::new();
    item.insert(PK.to_string(), s(key.pk));
    item.insert(SK.to_string(), s(key.sk));
    item.insert(ENTITY_TYPE.to_string(), s(entity_type));
    item
}

fn insert_index_key(item: &mut Item, key: KeyPair) {
    item.insert(GSI1PK.to_string(), s(key.pk));
    item.insert(GSI1SK.to_string(), s(key.sk));
}

// ============================================================================
// User conversions
// ============================================================================

pub fn user_to_item(user: &User) -> Result<Item> {
    let mut item = new_item(keys::user_key(&user.email)?, ENTITY_TYPE_USER);
    item.insert("Email".to_string(), s(&user.email));
    item.insert("Name".to_string(), s(&user.name));
    item.insert("Role".to_string(), s(user.role.as_str()));
    item.insert(
        "HashedPassword".to_string(),
        s(user.password_hash.as_str()),
    );
    item.insert("CreatedOn".to_string(), s(user.created_at.to_rfc3339()));
    Ok(item)
}

pub fn item_to_user(item: &Item) -> Result<User> {
    Ok(User {
        email: get_string(item, "Email")?,
        name: get_string(item, "Name")?,
        role: get_parsed(item, "Role")?,
        password_hash: PasswordHash::from_encoded(get_string(item, "HashedPassword")?),
        created_at: get_datetime(item, "CreatedOn")?,
    })
}

// ============================================================================
// Facility conversions
// ============================================================================

/// A new facility always carries an empty `Assets` map so that later
/// nested updates have a parent to write into.
pub fn facility_to_item(facility: &Facility) -> Result<Item> {
    let mut item = new_item(keys::facility_key(facility.id)?, ENTITY_TYPE_FACILITY);
    item.insert("ID".to_string(), s(facility.id.to_string()));
    item.insert("Name".to_string(), s(&facility.name));
    item.insert("Address".to_string(), s(&facility.address));
    item.insert("City".to_string(), s(&facility.city));
    item.insert("ImageURL".to_string(), s(&facility.image_url));
    item.insert("Creator".to_string(), s(&facility.creator));
    item.insert(OWNERS.to_string(), Attribute::Ss(facility.owners.clone()));
    item.insert(
        MAINTAINERS.to_string(),
        Attribute::Ss(facility.maintainers.clone()),
    );
    item.insert(
        ASSETS.to_string(),
        Attribute::M(
            facility
                .assets
                .iter()
                .map(|(name, added)| (name.clone(), s(added.to_rfc3339())))
                .collect(),
        ),
    );
    Ok(item)
}

pub fn item_to_facility(item: &Item) -> Result<Facility> {
    Ok(Facility {
        id: get_uuid(item, "ID")?,
        name: get_string(item, "Name")?,
        address: get_string(item, "Address")?,
        city: get_string(item, "City")?,
        image_url: get_string(item, "ImageURL")?,
        creator: get_string(item, "Creator")?,
        owners: get_string_set(item, OWNERS)?,
        maintainers: get_string_set(item, MAINTAINERS)?,
        assets: get_asset_map(item)?,
    })
}

/// Value stored under an asset name.
pub fn asset_added_on(added: DateTime<Utc>) -> Attribute {
    s(added.to_rfc3339())
}

// ============================================================================
// Space conversions
// ============================================================================

pub fn space_to_item(space: &Space) -> Result<Item> {
    let mut item = new_item(
        keys::space_key(space.facility_id, space.id)?,
        ENTITY_TYPE_SPACE,
    );
    item.insert("ID".to_string(), s(space.id.to_string()));
    item.insert("FacilityID".to_string(), s(space.facility_id.to_string()));
    item.insert("Name".to_string(), s(&space.name));
    item.insert("Location".to_string(), s(&space.location));
    item.insert("SchemaURL".to_string(), s(&space.schema_url));
    Ok(item)
}

pub fn item_to_space(item: &Item) -> Result<Space> {
    Ok(Space {
        id: get_uuid(item, "ID")?,
        facility_id: get_uuid(item, "FacilityID")?,
        name: get_string(item, "Name")?,
        location: get_string(item, "Location")?,
        schema_url: get_optional_string(item, "SchemaURL")?.unwrap_or_default(),
    })
}

// ============================================================================
// Task conversions
// ============================================================================

/// The attributes a task edit overwrites. Absent assignee and asset are
/// stored as their sentinels.
pub fn task_details_attributes(details: &TaskDetails) -> Vec<(String, Attribute)> {
    vec![
        ("Title".to_string(), s(&details.title)),
        ("Description".to_string(), s(&details.description)),
        ("StartDate".to_string(), s(&details.start_date)),
        ("EndDate".to_string(), s(&details.end_date)),
        ("CoordX".to_string(), s(&details.coord_x)),
        ("CoordY".to_string(), s(&details.coord_y)),
        ("Status".to_string(), s(details.status.as_str())),
        (
            "Assignee".to_string(),
            s(details.assignee.as_deref().unwrap_or(UNASSIGNED)),
        ),
        (
            "Asset".to_string(),
            s(details.asset.as_deref().unwrap_or(NO_ASSET)),
        ),
    ]
}

pub fn task_to_item(task: &Task) -> Result<Item> {
    let mut item = new_item(
        keys::task_key(task.facility_id, task.space_id, task.id)?,
        ENTITY_TYPE_TASK,
    );
    insert_index_key(&mut item, keys::task_index_key(task.facility_id, task.id)?);
    item.insert("ID".to_string(), s(task.id.to_string()));
    item.insert("FacilityID".to_string(), s(task.facility_id.to_string()));
    item.insert("SpaceID".to_string(), s(task.space_id.to_string()));
    item.insert("Creator".to_string(), s(&task.creator));
    item.extend(task_details_attributes(&task.details));
    Ok(item)
}

pub fn item_to_task(item: &Item) -> Result<Task> {
    Ok(Task {
        id: get_uuid(item, "ID")?,
        facility_id: get_uuid(item, "FacilityID")?,
        space_id: get_uuid(item, "SpaceID")?,
        creator: get_string(item, "Creator")?,
        details: TaskDetails {
            title: get_string(item, "Title")?,
            description: get_optional_string(item, "Description")?.unwrap_or_default(),
            start_date: get_string(item, "StartDate")?,
            end_date: get_string(item, "EndDate")?,
            coord_x: get_string(item, "CoordX")?,
            coord_y: get_string(item, "CoordY")?,
            status: get_parsed::<TaskStatus>(item, "Status")?,
            assignee: none_if_sentinel(get_optional_string(item, "Assignee")?, UNASSIGNED),
            asset: none_if_sentinel(get_optional_string(item, "Asset")?, NO_ASSET),
        },
    })
}

// ============================================================================
// Comment conversions
// ============================================================================

pub fn comment_to_item(comment: &Comment) -> Result<Item> {
    let mut item = new_item(
        keys::comment_key(
            comment.facility_id,
            comment.space_id,
            comment.task_id,
            comment.id,
        )?,
        ENTITY_TYPE_COMMENT,
    );
    item.insert("ID".to_string(), s(comment.id.to_string()));
    item.insert("FacilityID".to_string(), s(comment.facility_id.to_string()));
    item.insert("SpaceID".to_string(), s(comment.space_id.to_string()));
    item.insert("TaskID".to_string(), s(comment.task_id.to_string()));
    item.insert("Text".to_string(), s(&comment.text));
    item.insert("CreatedOn".to_string(), s(comment.created_at.to_rfc3339()));
    item.insert("CreatorEmail".to_string(), s(&comment.author_email));
    item.insert("CreatorName".to_string(), s(&comment.author_name));
    Ok(item)
}

pub fn item_to_comment(item: &Item) -> Result<Comment> {
    Ok(Comment {
        id: get_uuid(item, "ID")?,
        facility_id: get_uuid(item, "FacilityID")?,
        space_id: get_uuid(item, "SpaceID")?,
        task_id: get_uuid(item, "TaskID")?,
        text: get_string(item, "Text")?,
        created_at: get_datetime(item, "CreatedOn")?,
        author_email: get_string(item, "CreatorEmail")?,
        author_name: get_string(item, "CreatorName")?,
    })
}

// ============================================================================
// Membership conversions
// ============================================================================

pub fn membership_to_item(membership: &Membership) -> Result<Item> {
    let mut item = new_item(
        keys::membership_key(&membership.user_email, membership.facility_id)?,
        ENTITY_TYPE_MEMBERSHIP,
    );
    insert_index_key(
        &mut item,
        keys::membership_index_key(&membership.user_email, membership.facility_id)?,
    );
    item.insert(
        "FacilityID".to_string(),
        s(membership.facility_id.to_string()),
    );
    item.insert("FacilityName".to_string(), s(&membership.facility_name));
    item.insert(
        "FacilityAddress".to_string(),
        s(&membership.facility_address),
    );
    item.insert("FacilityCity".to_string(), s(&membership.facility_city));
    item.insert(
        "FacilityImageURL".to_string(),
        s(&membership.facility_image_url),
    );
    item.insert("UserEmail".to_string(), s(&membership.user_email));
    item.insert("UserName".to_string(), s(&membership.user_name));
    item.insert("UserRole".to_string(), s(membership.user_role.as_str()));
    item.insert(
        "UserAddedOn".to_string(),
        s(membership.added_on.to_rfc3339()),
    );
    Ok(item)
}

pub fn item_to_membership(item: &Item) -> Result<Membership> {
    Ok(Membership {
        user_email: get_string(item, "UserEmail")?,
        user_name: get_string(item, "UserName")?,
        user_role: get_parsed(item, "UserRole")?,
        added_on: get_datetime(item, "UserAddedOn")?,
        facility_id: get_uuid(item, "FacilityID")?,
        facility_name: get_string(item, "FacilityName")?,
        facility_address: get_string(item, "FacilityAddress")?,
        facility_city: get_string(item, "FacilityCity")?,
        facility_image_url: get_string(item, "FacilityImageURL")?,
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn get_string(item: &Item, key: &str) -> Result<String> {
    get_optional_string(item, key)?
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing attribute: {key}")))
}

fn get_optional_string(item: &Item, key: &str) -> Result<Option<String>> {
    match item.get(key) {
        None => Ok(None),
        Some(Attribute::S(value)) => Ok(Some(value.clone())),
        Some(_) => Err(RepositoryError::InvalidData(format!(
            "Attribute {key} is not a string"
        ))),
    }
}

/// Sets are absent when empty, so absence decodes to an empty set.
fn get_string_set(item: &Item, key: &str) -> Result<BTreeSet<String>> {
    match item.get(key) {
        None => Ok(BTreeSet::new()),
        Some(Attribute::Ss(values)) => Ok(values.clone()),
        Some(_) => Err(RepositoryError::InvalidData(format!(
            "Attribute {key} is not a string set"
        ))),
    }
}

fn get_asset_map(item: &Item) -> Result<BTreeMap<String, DateTime<Utc>>> {
    let Some(attribute) = item.get(ASSETS) else {
        return Ok(BTreeMap::new());
    };
    let entries = attribute.as_m().ok_or_else(|| {
        RepositoryError::InvalidData(format!("Attribute {ASSETS} is not a map"))
    })?;

    entries
        .iter()
        .map(|(name, added)| {
            let added = added.as_s().ok_or_else(|| {
                RepositoryError::InvalidData(format!("Asset {name} has no timestamp"))
            })?;
            Ok((name.clone(), parse_datetime(added, name)?))
        })
        .collect()
}

fn get_uuid(item: &Item, key: &str) -> Result<Uuid> {
    let value = get_string(item, key)?;
    Uuid::parse_str(&value)
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid UUID for {key}: {e}")))
}

fn get_datetime(item: &Item, key: &str) -> Result<DateTime<Utc>> {
    parse_datetime(&get_string(item, key)?, key)
}

fn parse_datetime(value: &str, key: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid datetime for {key}: {e}")))
}

fn get_parsed<T>(item: &Item, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = get_string(item, key)?;
    value
        .parse()
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid {key}: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::{SubsecRound, Utc};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }

    fn facility() -> Facility {
        Facility {
            id: Uuid::new_v4(),
            name: "Plant".to_string(),
            address: "1 Main Street".to_string(),
            city: "Springfield".to_string(),
            image_url: "https://img/plant.png".to_string(),
            creator: "bob@x.com".to_string(),
            owners: BTreeSet::from(["bob@x.com".to_string()]),
            maintainers: BTreeSet::from(["alice@x.com".to_string()]),
            assets: BTreeMap::from([("Pump-1".to_string(), now())]),
        }
    }

    fn task() -> Task {
        Task {
            id: Uuid::new_v4(),
            facility_id: Uuid::new_v4(),
            space_id: Uuid::new_v4(),
            creator: "bob@x.com".to_string(),
            details: TaskDetails {
                title: "Fix the pump".to_string(),
                description: "Leaking seal".to_string(),
                start_date: "2024-06-01T08:00:00Z".to_string(),
                end_date: "2024-06-02T08:00:00Z".to_string(),
                coord_x: "12.5".to_string(),
                coord_y: "40".to_string(),
                status: TaskStatus::Unassigned,
                assignee: None,
                asset: None,
            },
        }
    }

    #[test]
    fn test_user_item_keeps_hash_only() {
        let user = User {
            email: "alice@x.com".to_string(),
            name: "Alice Smith".to_string(),
            role: Role::Maintainer,
            password_hash: PasswordHash::with_cost("pa55word", 4).unwrap(),
            created_at: now(),
        };

        let item = user_to_item(&user).unwrap();

        assert_eq!(item[PK].as_s(), Some("USER#alice@x.com"));
        assert_eq!(item["Role"].as_s(), Some("Maintainer"));
        assert!(item.values().all(|v| v.as_s() != Some("pa55word")));
        assert_eq!(item_to_user(&item).unwrap(), user);
    }

    #[test]
    fn test_facility_round_trip() {
        let facility = facility();
        let item = facility_to_item(&facility).unwrap();

        assert_eq!(item[ENTITY_TYPE].as_s(), Some(ENTITY_TYPE_FACILITY));
        assert_eq!(item_to_facility(&item).unwrap(), facility);
    }

    #[test]
    fn test_facility_without_sets_decodes_empty() {
        let mut item = facility_to_item(&facility()).unwrap();
        item.remove(MAINTAINERS);
        item.remove(ASSETS);

        let decoded = item_to_facility(&item).unwrap();

        assert!(decoded.maintainers.is_empty());
        assert!(decoded.assets.is_empty());
    }

    #[test]
    fn test_task_item_uses_sentinels() {
        let task = task();
        let item = task_to_item(&task).unwrap();

        assert_eq!(item["Assignee"].as_s(), Some(UNASSIGNED));
        assert_eq!(item["Asset"].as_s(), Some(NO_ASSET));
        assert_eq!(item["Status"].as_s(), Some("Unassigned"));
        assert_eq!(
            item[GSI1PK].as_s(),
            Some(format!("FACILITY#{}", task.facility_id).as_str())
        );
        assert_eq!(item_to_task(&item).unwrap(), task);
    }

    #[test]
    fn test_task_with_assignee_round_trip() {
        let mut task = task();
        task.details.assignee = Some("alice@x.com".to_string());
        task.details.asset = Some("Pump-1".to_string());
        task.details.status = TaskStatus::InProgress;

        let item = task_to_item(&task).unwrap();

        assert_eq!(item["Status"].as_s(), Some("In progress"));
        assert_eq!(item_to_task(&item).unwrap(), task);
    }

    #[test]
    fn test_comment_and_space_round_trip() {
        let comment = Comment {
            id: Uuid::new_v4(),
            facility_id: Uuid::new_v4(),
            space_id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            text: "Seal replaced".to_string(),
            created_at: now(),
            author_email: "alice@x.com".to_string(),
            author_name: "Alice Smith".to_string(),
        };
        let item = comment_to_item(&comment).unwrap();
        assert!(!item.contains_key(GSI1PK));
        assert_eq!(item_to_comment(&item).unwrap(), comment);

        let space = Space {
            id: Uuid::new_v4(),
            facility_id: Uuid::new_v4(),
            name: "Boiler room".to_string(),
            location: "Basement level 2".to_string(),
            schema_url: "https://img/boiler.png".to_string(),
        };
        assert_eq!(item_to_space(&space_to_item(&space).unwrap()).unwrap(), space);
    }

    #[test]
    fn test_membership_round_trip() {
        let membership = Membership {
            user_email: "alice@x.com".to_string(),
            user_name: "Alice Smith".to_string(),
            user_role: Role::Maintainer,
            added_on: now(),
            facility_id: Uuid::new_v4(),
            facility_name: "Plant".to_string(),
            facility_address: "1 Main Street".to_string(),
            facility_city: "Springfield".to_string(),
            facility_image_url: "https://img/plant.png".to_string(),
        };

        let item = membership_to_item(&membership).unwrap();

        assert_eq!(item[GSI1SK].as_s(), Some("USER#alice@x.com"));
        assert_eq!(item_to_membership(&item).unwrap(), membership);
    }

    #[test]
    fn test_bad_attributes_are_invalid_data() {
        let mut item = task_to_item(&task()).unwrap();
        item.insert("Status".to_string(), s("Done"));
        assert!(matches!(
            item_to_task(&item),
            Err(RepositoryError::InvalidData(_))
        ));

        item.remove("Title");
        assert_eq!(
            item_to_task(&item).unwrap_err(),
            RepositoryError::InvalidData("Missing attribute: Title".to_string())
        );
    }

    #[test]
    fn test_member_set_attribute() {
        assert_eq!(member_set_attribute(Role::Owner), "Owners");
        assert_eq!(member_set_attribute(Role::Maintainer), "Maintainers");
    }
}
