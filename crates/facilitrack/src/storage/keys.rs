//! Key generation functions for the single-table design.
//!
//! Pure functions mapping entity identifiers to composite keys. An empty
//! identifier (nil UUID or blank email) yields `NotFound` instead of a key
//! that could match some other item.
//!
//! | Entity     | PK                        | SK                       | GSI1PK        | GSI1SK       |
//! |------------|---------------------------|--------------------------|---------------|--------------|
//! | User       | `USER#<email>`            | `USER#<email>`           |               |              |
//! | Facility   | `FACILITY#<f>`            | `FACILITY#<f>`           |               |              |
//! | Space      | `FACILITY#<f>`            | `SPACE#<s>`              |               |              |
//! | Task       | `FACILITY#<f>SPACE#<s>`   | `TASK##<t>`              | `FACILITY#<f>`| `TASK##<t>`  |
//! | Comment    | `FACILITY#<f>SPACE#<s>`   | `TASK##<t>#COMMENT#<c>`  |               |              |
//! | Membership | `USER#<email>`            | `FACILITY#<f>`           | `FACILITY#<f>`| `USER#<email>`|

use facilitrack_core::storage::{RepositoryError, Result};
use uuid::Uuid;

use super::store::KeyPair;

// ============================================================================
// Key prefixes
// ============================================================================

pub const USER_PREFIX: &str = "USER#";
pub const FACILITY_PREFIX: &str = "FACILITY#";
pub const SPACE_PREFIX: &str = "SPACE#";
pub const TASK_PREFIX: &str = "TASK##";
pub const COMMENT_PREFIX: &str = "COMMENT#";

const COMMENT_SEPARATOR: &str = "#COMMENT#";

fn require_id(id: Uuid, entity_type: &'static str) -> Result<Uuid> {
    if id.is_nil() {
        return Err(RepositoryError::not_found(entity_type, id.to_string()));
    }
    Ok(id)
}

fn require_email<'a>(email: &'a str, entity_type: &'static str) -> Result<&'a str> {
    if email.trim().is_empty() {
        return Err(RepositoryError::not_found(entity_type, email));
    }
    Ok(email)
}

// ============================================================================
// User keys
// ============================================================================

/// Pattern: `USER#<email>` / `USER#<email>`
pub fn user_key(email: &str) -> Result<KeyPair> {
    let email = require_email(email, "User")?;
    Ok(KeyPair::new(
        format!("{USER_PREFIX}{email}"),
        format!("{USER_PREFIX}{email}"),
    ))
}

/// Partition holding a user and their memberships.
pub fn user_partition(email: &str) -> Result<String> {
    let email = require_email(email, "User")?;
    Ok(format!("{USER_PREFIX}{email}"))
}

// ============================================================================
// Facility keys
// ============================================================================

/// Partition holding a facility and its spaces. Also the `GSI1` partition of
/// its tasks and memberships.
pub fn facility_partition(facility_id: Uuid) -> Result<String> {
    let facility_id = require_id(facility_id, "Facility")?;
    Ok(format!("{FACILITY_PREFIX}{facility_id}"))
}

/// Pattern: `FACILITY#<id>` / `FACILITY#<id>`
pub fn facility_key(facility_id: Uuid) -> Result<KeyPair> {
    let partition = facility_partition(facility_id)?;
    Ok(KeyPair::new(partition.clone(), partition))
}

// ============================================================================
// Space keys
// ============================================================================

/// Pattern: `FACILITY#<facility_id>` / `SPACE#<space_id>`
pub fn space_key(facility_id: Uuid, space_id: Uuid) -> Result<KeyPair> {
    let space_id = require_id(space_id, "Space")?;
    Ok(KeyPair::new(
        facility_partition(facility_id)?,
        format!("{SPACE_PREFIX}{space_id}"),
    ))
}

// ============================================================================
// Task keys
// ============================================================================

/// Partition holding the tasks and comments of one space.
///
/// Pattern: `FACILITY#<facility_id>SPACE#<space_id>`
pub fn task_partition(facility_id: Uuid, space_id: Uuid) -> Result<String> {
    let space_id = require_id(space_id, "Space")?;
    Ok(format!(
        "{}{SPACE_PREFIX}{space_id}",
        facility_partition(facility_id)?
    ))
}

/// Sort key prefix shared by a task row and its comments.
pub fn task_sort_prefix(task_id: Uuid) -> Result<String> {
    let task_id = require_id(task_id, "Task")?;
    Ok(format!("{TASK_PREFIX}{task_id}"))
}

/// Pattern: `FACILITY#<f>SPACE#<s>` / `TASK##<t>`
pub fn task_key(facility_id: Uuid, space_id: Uuid, task_id: Uuid) -> Result<KeyPair> {
    Ok(KeyPair::new(
        task_partition(facility_id, space_id)?,
        task_sort_prefix(task_id)?,
    ))
}

/// Pattern: `FACILITY#<f>` / `TASK##<t>`
pub fn task_index_key(facility_id: Uuid, task_id: Uuid) -> Result<KeyPair> {
    Ok(KeyPair::new(
        facility_partition(facility_id)?,
        task_sort_prefix(task_id)?,
    ))
}

// ============================================================================
// Comment keys
// ============================================================================

/// Sort key prefix of every comment on a task.
///
/// Pattern: `TASK##<task_id>#COMMENT#`
pub fn comment_prefix(task_id: Uuid) -> Result<String> {
    Ok(format!("{}{COMMENT_SEPARATOR}", task_sort_prefix(task_id)?))
}

/// Pattern: `FACILITY#<f>SPACE#<s>` / `TASK##<t>#COMMENT#<c>`
pub fn comment_key(
    facility_id: Uuid,
    space_id: Uuid,
    task_id: Uuid,
    comment_id: Uuid,
) -> Result<KeyPair> {
    let comment_id = require_id(comment_id, "Comment")?;
    Ok(KeyPair::new(
        task_partition(facility_id, space_id)?,
        format!("{}{comment_id}", comment_prefix(task_id)?),
    ))
}

// ============================================================================
// Membership keys
// ============================================================================

/// Pattern: `USER#<email>` / `FACILITY#<facility_id>`
pub fn membership_key(email: &str, facility_id: Uuid) -> Result<KeyPair> {
    Ok(KeyPair::new(
        user_partition(email)?,
        facility_partition(facility_id)?,
    ))
}

/// Pattern: `FACILITY#<facility_id>` / `USER#<email>`
pub fn membership_index_key(email: &str, facility_id: Uuid) -> Result<KeyPair> {
    Ok(KeyPair::new(
        facility_partition(facility_id)?,
        user_partition(email)?,
    ))
}

// ============================================================================
// Decoding
// ============================================================================

/// What a sort key addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    User(String),
    Facility(Uuid),
    Space(Uuid),
    Task(Uuid),
    Comment { task_id: Uuid, comment_id: Uuid },
}

/// Decodes a sort key written by this module. Unknown shapes yield `None`.
pub fn decode_sort_key(sk: &str) -> Option<SortKey> {
    if let Some(rest) = sk.strip_prefix(TASK_PREFIX) {
        return match rest.split_once(COMMENT_SEPARATOR) {
            Some((task_id, comment_id)) => Some(SortKey::Comment {
                task_id: task_id.parse().ok()?,
                comment_id: comment_id.parse().ok()?,
            }),
            None => rest.parse().ok().map(SortKey::Task),
        };
    }
    if let Some(rest) = sk.strip_prefix(SPACE_PREFIX) {
        return rest.parse().ok().map(SortKey::Space);
    }
    if let Some(rest) = sk.strip_prefix(FACILITY_PREFIX) {
        return rest.parse().ok().map(SortKey::Facility);
    }
    sk.strip_prefix(USER_PREFIX)
        .filter(|email| !email.is_empty())
        .map(|email| SortKey::User(email.to_string()))
}
