//! Store-neutral view of the single table.
//!
//! Repositories talk to an [`ItemStore`] in terms of composite keys and
//! loosely typed items. Backends translate these primitives to their own
//! client calls.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use facilitrack_core::storage::RepositoryError;
use thiserror::Error;

pub const PK: &str = "PK";
pub const SK: &str = "SK";
pub const GSI1PK: &str = "GSI1PK";
pub const GSI1SK: &str = "GSI1SK";
pub const GSI1: &str = "GSI1";

/// Attribute types the table uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    S(String),
    Ss(BTreeSet<String>),
    M(BTreeMap<String, Attribute>),
}

impl Attribute {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Attribute::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ss(&self) -> Option<&BTreeSet<String>> {
        match self {
            Attribute::Ss(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_m(&self) -> Option<&BTreeMap<String, Attribute>> {
        match self {
            Attribute::M(map) => Some(map),
            _ => None,
        }
    }
}

pub type Item = HashMap<String, Attribute>;

/// A composite (partition, sort) key, for the table or for `GSI1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPair {
    pub pk: String,
    pub sk: String,
}

impl KeyPair {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    /// Reads the primary key back out of a stored item.
    pub fn from_item(item: &Item) -> Option<Self> {
        let pk = item.get(PK)?.as_s()?;
        let sk = item.get(SK)?.as_s()?;
        Some(Self::new(pk, sk))
    }
}

/// Which key a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    Primary,
    Gsi1,
}

impl Index {
    /// Index name to pass to the store, `None` for the table itself.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Index::Primary => None,
            Index::Gsi1 => Some(GSI1),
        }
    }

    /// Partition and sort key attribute names.
    pub fn key_attributes(&self) -> (&'static str, &'static str) {
        match self {
            Index::Primary => (PK, SK),
            Index::Gsi1 => (GSI1PK, GSI1SK),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortCondition {
    Equals(String),
    BeginsWith(String),
}

impl SortCondition {
    pub fn matches(&self, sort_key: &str) -> bool {
        match self {
            SortCondition::Equals(value) => sort_key == value,
            SortCondition::BeginsWith(prefix) => sort_key.starts_with(prefix.as_str()),
        }
    }
}

/// A key-condition query: one partition, optionally narrowed on the sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyQuery {
    pub index: Index,
    pub partition: String,
    pub sort: SortCondition,
}

impl KeyQuery {
    pub fn primary(partition: impl Into<String>, sort: SortCondition) -> Self {
        Self {
            index: Index::Primary,
            partition: partition.into(),
            sort,
        }
    }

    pub fn gsi1(partition: impl Into<String>, sort: SortCondition) -> Self {
        Self {
            index: Index::Gsi1,
            partition: partition.into(),
            sort,
        }
    }

    /// Exact lookup of one primary key.
    pub fn exact(key: &KeyPair) -> Self {
        Self::primary(key.pk.clone(), SortCondition::Equals(key.sk.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutCondition {
    /// Overwrite whatever is stored under the key.
    Always,
    /// Fail with [`StoreError::ConditionFailed`] if the key is taken.
    KeyAbsent,
}

/// Targeted single-item updates. Every variant requires the item to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemUpdate {
    /// Overwrites the listed attributes.
    Set(Vec<(String, Attribute)>),
    /// Adds `value` to a string set, creating the set if needed.
    AddToSet { attribute: String, value: String },
    /// Removes `value` from a string set. Removing the last value drops the set.
    RemoveFromSet { attribute: String, value: String },
    /// Adds `key` to a map attribute; the condition fails if it is present.
    InsertMapEntry {
        attribute: String,
        key: String,
        value: Attribute,
    },
    /// Removes `key` from a map attribute; the condition fails if it is absent.
    RemoveMapEntry { attribute: String, key: String },
}

/// Errors reported by an [`ItemStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("conditional check failed")]
    ConditionFailed,
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Rejected(String),
    #[error("malformed item: {0}")]
    Malformed(String),
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConditionFailed => {
                RepositoryError::QueryFailed("unexpected conditional check failure".to_string())
            }
            StoreError::Timeout(_) | StoreError::Unavailable(_) => {
                tracing::error!(error = %err, "store unavailable");
                RepositoryError::StoreUnavailable(err.to_string())
            }
            StoreError::Rejected(msg) => RepositoryError::QueryFailed(msg),
            StoreError::Malformed(msg) => RepositoryError::InvalidData(msg),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Primitive operations of the single-table store.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get_item(&self, key: &KeyPair) -> StoreResult<Option<Item>>;

    async fn put_item(&self, item: Item, condition: PutCondition) -> StoreResult<()>;

    /// Runs a key-condition query to exhaustion, in sort-key order.
    async fn query(&self, query: &KeyQuery) -> StoreResult<Vec<Item>>;

    /// Applies `update` and returns the item as stored afterwards.
    async fn update_item(&self, key: &KeyPair, update: &ItemUpdate) -> StoreResult<Item>;

    async fn delete_item(&self, key: &KeyPair) -> StoreResult<()>;

    /// Deletes many items in as few round trips as the store allows.
    ///
    /// Not atomic across items.
    async fn batch_delete(&self, keys: &[KeyPair]) -> StoreResult<()>;
}

/// Runs one store call under `limit`.
pub async fn bounded<T, F>(limit: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_condition_matches() {
        let begins = SortCondition::BeginsWith("SPACE#".to_string());
        assert!(begins.matches("SPACE#123"));
        assert!(!begins.matches("FACILITY#123"));

        let equals = SortCondition::Equals("SPACE#123".to_string());
        assert!(equals.matches("SPACE#123"));
        assert!(!equals.matches("SPACE#1234"));
    }

    #[test]
    fn test_key_pair_from_item() {
        let item = Item::from([
            (PK.to_string(), Attribute::S("USER#a@x.com".to_string())),
            (SK.to_string(), Attribute::S("USER#a@x.com".to_string())),
        ]);
        assert_eq!(
            KeyPair::from_item(&item),
            Some(KeyPair::new("USER#a@x.com", "USER#a@x.com"))
        );
        assert_eq!(KeyPair::from_item(&Item::new()), None);
    }

    #[test]
    fn test_index_key_attributes() {
        assert_eq!(Index::Primary.key_attributes(), ("PK", "SK"));
        assert_eq!(Index::Gsi1.key_attributes(), ("GSI1PK", "GSI1SK"));
        assert_eq!(Index::Gsi1.name(), Some("GSI1"));
    }

    #[test]
    fn test_store_error_conversion() {
        let err: RepositoryError = StoreError::Timeout(Duration::from_secs(3)).into();
        assert!(matches!(err, RepositoryError::StoreUnavailable(_)));

        let err: RepositoryError = StoreError::Malformed("no PK".to_string()).into();
        assert_eq!(err, RepositoryError::InvalidData("no PK".to_string()));
    }

    #[tokio::test]
    async fn test_bounded_passes_through_fast_calls() {
        let result = bounded(Duration::from_secs(1), async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_bounded_times_out_slow_calls() {
        let limit = Duration::from_millis(10);
        let result = bounded(limit, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, StoreError>(())
        })
        .await;
        assert_eq!(result, Err(StoreError::Timeout(limit)));
    }
}
