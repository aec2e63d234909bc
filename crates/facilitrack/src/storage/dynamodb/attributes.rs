//! Conversion between [`Attribute`] and the SDK's `AttributeValue`.
//!
//! DynamoDB rejects empty string sets, so they are left out of written items.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::storage::store::{Attribute, Item, KeyPair, StoreError, StoreResult, PK, SK};

pub type RawItem = HashMap<String, AttributeValue>;

/// `None` for values DynamoDB cannot store.
pub fn to_attribute_value(attribute: &Attribute) -> Option<AttributeValue> {
    match attribute {
        Attribute::S(s) => Some(AttributeValue::S(s.clone())),
        Attribute::Ss(set) if set.is_empty() => None,
        Attribute::Ss(set) => Some(AttributeValue::Ss(set.iter().cloned().collect())),
        Attribute::M(map) => Some(AttributeValue::M(
            map.iter()
                .filter_map(|(k, v)| to_attribute_value(v).map(|v| (k.clone(), v)))
                .collect(),
        )),
    }
}

pub fn from_attribute_value(value: &AttributeValue) -> StoreResult<Attribute> {
    match value {
        AttributeValue::S(s) => Ok(Attribute::S(s.clone())),
        AttributeValue::Ss(values) => Ok(Attribute::Ss(values.iter().cloned().collect())),
        AttributeValue::M(map) => map
            .iter()
            .map(|(k, v)| Ok((k.clone(), from_attribute_value(v)?)))
            .collect::<StoreResult<_>>()
            .map(Attribute::M),
        other => Err(StoreError::Malformed(format!(
            "unsupported attribute type: {other:?}"
        ))),
    }
}

pub fn to_raw_item(item: &Item) -> RawItem {
    item.iter()
        .filter_map(|(k, v)| to_attribute_value(v).map(|v| (k.clone(), v)))
        .collect()
}

pub fn from_raw_item(raw: &RawItem) -> StoreResult<Item> {
    raw.iter()
        .map(|(k, v)| Ok((k.clone(), from_attribute_value(v)?)))
        .collect()
}

/// Primary key map for `GetItem`, `DeleteItem` and `UpdateItem`.
pub fn raw_key(key: &KeyPair) -> RawItem {
    HashMap::from([
        (PK.to_string(), AttributeValue::S(key.pk.clone())),
        (SK.to_string(), AttributeValue::S(key.sk.clone())),
    ])
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;

    #[test]
    fn test_empty_string_set_is_omitted() {
        let item = Item::from([
            ("Name".to_string(), Attribute::S("Plant".to_string())),
            ("Maintainers".to_string(), Attribute::Ss(BTreeSet::new())),
        ]);

        let raw = to_raw_item(&item);

        assert_eq!(raw.len(), 1);
        assert!(!raw.contains_key("Maintainers"));
    }

    #[test]
    fn test_item_survives_conversion() {
        let item = Item::from([
            ("PK".to_string(), Attribute::S("FACILITY#1".to_string())),
            (
                "Owners".to_string(),
                Attribute::Ss(BTreeSet::from(["a@x.com".to_string(), "b@x.com".to_string()])),
            ),
            (
                "Assets".to_string(),
                Attribute::M(BTreeMap::from([(
                    "Pump-1".to_string(),
                    Attribute::S("2024-06-01T08:00:00+00:00".to_string()),
                )])),
            ),
        ]);

        assert_eq!(from_raw_item(&to_raw_item(&item)).unwrap(), item);
    }

    #[test]
    fn test_empty_map_is_kept() {
        let raw = to_attribute_value(&Attribute::M(BTreeMap::new()));
        assert_eq!(raw, Some(AttributeValue::M(HashMap::new())));
    }

    #[test]
    fn test_unsupported_type_is_malformed() {
        let result = from_attribute_value(&AttributeValue::N("3".to_string()));
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[test]
    fn test_raw_key() {
        let raw = raw_key(&KeyPair::new("USER#a@x.com", "USER#a@x.com"));
        assert_eq!(raw.len(), 2);
        assert_eq!(raw["PK"], AttributeValue::S("USER#a@x.com".to_string()));
    }
}
