//! In-memory single-table store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::storage::store::{
    Attribute, Index, Item, ItemStore, ItemUpdate, KeyPair, KeyQuery, PutCondition, StoreError,
    StoreResult,
};

/// In-memory store emulating the table and its `GSI1` index.
///
/// Items live in a `BTreeMap` ordered by (PK, SK) wrapped in `Arc<RwLock<_>>`.
/// Conditional writes, set and map updates behave as DynamoDB's do. Data is
/// lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    items: Arc<RwLock<BTreeMap<KeyPair, Item>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items, index entries excluded.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

fn sort_value<'a>(item: &'a Item, attribute: &str) -> Option<&'a str> {
    item.get(attribute).and_then(Attribute::as_s)
}

/// Empty sets cannot be stored, so they are dropped on write.
fn without_empty_sets(mut item: Item) -> Item {
    item.retain(|_, value| !matches!(value, Attribute::Ss(set) if set.is_empty()));
    item
}

fn apply(item: &mut Item, update: &ItemUpdate) -> StoreResult<()> {
    match update {
        ItemUpdate::Set(fields) => {
            item.extend(fields.iter().cloned());
        }
        ItemUpdate::AddToSet { attribute, value } => {
            match item
                .entry(attribute.clone())
                .or_insert_with(|| Attribute::Ss(Default::default()))
            {
                Attribute::Ss(set) => {
                    set.insert(value.clone());
                }
                _ => {
                    return Err(StoreError::Rejected(format!(
                        "{attribute} is not a string set"
                    )))
                }
            }
        }
        ItemUpdate::RemoveFromSet { attribute, value } => {
            let now_empty = match item.get_mut(attribute) {
                Some(Attribute::Ss(set)) => {
                    set.remove(value);
                    set.is_empty()
                }
                _ => false,
            };
            if now_empty {
                item.remove(attribute);
            }
        }
        ItemUpdate::InsertMapEntry {
            attribute,
            key,
            value,
        } => {
            let Some(Attribute::M(map)) = item.get_mut(attribute) else {
                return Err(StoreError::Rejected(format!(
                    "The document path {attribute} is invalid for update"
                )));
            };
            if map.contains_key(key) {
                return Err(StoreError::ConditionFailed);
            }
            map.insert(key.clone(), value.clone());
        }
        ItemUpdate::RemoveMapEntry { attribute, key } => {
            let removed = match item.get_mut(attribute) {
                Some(Attribute::M(map)) => map.remove(key),
                _ => None,
            };
            if removed.is_none() {
                return Err(StoreError::ConditionFailed);
            }
        }
    }
    Ok(())
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn get_item(&self, key: &KeyPair) -> StoreResult<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.get(key).cloned())
    }

    async fn put_item(&self, item: Item, condition: PutCondition) -> StoreResult<()> {
        let key = KeyPair::from_item(&item)
            .ok_or_else(|| StoreError::Malformed("item has no PK/SK".to_string()))?;

        let mut items = self.items.write().await;
        if condition == PutCondition::KeyAbsent && items.contains_key(&key) {
            return Err(StoreError::ConditionFailed);
        }
        items.insert(key, without_empty_sets(item));
        Ok(())
    }

    async fn query(&self, query: &KeyQuery) -> StoreResult<Vec<Item>> {
        let items = self.items.read().await;
        let (pk_attr, sk_attr) = query.index.key_attributes();

        let mut matches: Vec<(&str, &Item)> = match query.index {
            Index::Primary => items
                .iter()
                .filter(|(key, _)| key.pk == query.partition && query.sort.matches(&key.sk))
                .map(|(key, item)| (key.sk.as_str(), item))
                .collect(),
            Index::Gsi1 => items
                .values()
                .filter_map(|item| {
                    let pk = sort_value(item, pk_attr)?;
                    let sk = sort_value(item, sk_attr)?;
                    (pk == query.partition && query.sort.matches(sk)).then_some((sk, item))
                })
                .collect(),
        };
        matches.sort_by(|a, b| a.0.cmp(b.0));

        Ok(matches.into_iter().map(|(_, item)| item.clone()).collect())
    }

    async fn update_item(&self, key: &KeyPair, update: &ItemUpdate) -> StoreResult<Item> {
        let mut items = self.items.write().await;
        let item = items.get_mut(key).ok_or(StoreError::ConditionFailed)?;

        // Apply to a copy so a failed condition leaves the item untouched.
        let mut updated = item.clone();
        apply(&mut updated, update)?;
        *item = updated;

        Ok(item.clone())
    }

    async fn delete_item(&self, key: &KeyPair) -> StoreResult<()> {
        self.items.write().await.remove(key);
        Ok(())
    }

    async fn batch_delete(&self, keys: &[KeyPair]) -> StoreResult<()> {
        let mut items = self.items.write().await;
        for key in keys {
            items.remove(key);
        }
        Ok(())
    }
}
