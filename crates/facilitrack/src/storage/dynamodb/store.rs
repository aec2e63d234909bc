//! [`ItemStore`] backed by a DynamoDB table.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, ReturnValue, WriteRequest};
use aws_sdk_dynamodb::Client;

use super::attributes::{from_raw_item, raw_key, to_attribute_value, to_raw_item, RawItem};
use super::error::{
    map_batch_write_error, map_delete_item_error, map_get_item_error, map_put_item_error,
    map_query_error, map_update_item_error,
};
use crate::storage::store::{
    bounded, Item, ItemStore, ItemUpdate, KeyPair, KeyQuery, PutCondition, SortCondition,
    StoreError, StoreResult,
};

/// Most delete requests one `BatchWriteItem` call accepts.
const BATCH_SIZE: usize = 25;

const ITEM_EXISTS: &str = "attribute_exists(PK)";

/// An `UpdateItem` request in expression form.
#[derive(Debug, Clone, PartialEq)]
struct UpdateExpression {
    update: String,
    condition: String,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl UpdateExpression {
    fn from_update(update: &ItemUpdate) -> StoreResult<Self> {
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        let (update, condition) = match update {
            ItemUpdate::Set(fields) => {
                let mut set = Vec::new();
                let mut remove = Vec::new();
                for (i, (attribute, value)) in fields.iter().enumerate() {
                    names.insert(format!("#a{i}"), attribute.clone());
                    match to_attribute_value(value) {
                        Some(value) => {
                            values.insert(format!(":v{i}"), value);
                            set.push(format!("#a{i} = :v{i}"));
                        }
                        None => remove.push(format!("#a{i}")),
                    }
                }
                let mut clauses = Vec::new();
                if !set.is_empty() {
                    clauses.push(format!("SET {}", set.join(", ")));
                }
                if !remove.is_empty() {
                    clauses.push(format!("REMOVE {}", remove.join(", ")));
                }
                (clauses.join(" "), ITEM_EXISTS.to_string())
            }
            ItemUpdate::AddToSet { attribute, value } => {
                names.insert("#a".to_string(), attribute.clone());
                values.insert(":v".to_string(), AttributeValue::Ss(vec![value.clone()]));
                ("ADD #a :v".to_string(), ITEM_EXISTS.to_string())
            }
            ItemUpdate::RemoveFromSet { attribute, value } => {
                names.insert("#a".to_string(), attribute.clone());
                values.insert(":v".to_string(), AttributeValue::Ss(vec![value.clone()]));
                ("DELETE #a :v".to_string(), ITEM_EXISTS.to_string())
            }
            ItemUpdate::InsertMapEntry {
                attribute,
                key,
                value,
            } => {
                names.insert("#a".to_string(), attribute.clone());
                names.insert("#k".to_string(), key.clone());
                let value = to_attribute_value(value).ok_or_else(|| {
                    StoreError::Rejected(format!("empty value for {attribute}.{key}"))
                })?;
                values.insert(":v".to_string(), value);
                (
                    "SET #a.#k = :v".to_string(),
                    format!("{ITEM_EXISTS} AND attribute_not_exists(#a.#k)"),
                )
            }
            ItemUpdate::RemoveMapEntry { attribute, key } => {
                names.insert("#a".to_string(), attribute.clone());
                names.insert("#k".to_string(), key.clone());
                (
                    "REMOVE #a.#k".to_string(),
                    format!("{ITEM_EXISTS} AND attribute_exists(#a.#k)"),
                )
            }
        };

        Ok(Self {
            update,
            condition,
            names,
            values,
        })
    }
}

/// Key condition expression for a query, with its placeholder values.
fn key_condition(query: &KeyQuery) -> (String, HashMap<String, String>, RawItem) {
    let (pk_name, sk_name) = query.index.key_attributes();
    let (sort_clause, sort_value) = match &query.sort {
        SortCondition::Equals(value) => ("#sk = :sk", value),
        SortCondition::BeginsWith(prefix) => ("begins_with(#sk, :sk)", prefix),
    };

    let names = HashMap::from([
        ("#pk".to_string(), pk_name.to_string()),
        ("#sk".to_string(), sk_name.to_string()),
    ]);
    let values = HashMap::from([
        (":pk".to_string(), AttributeValue::S(query.partition.clone())),
        (":sk".to_string(), AttributeValue::S(sort_value.clone())),
    ]);

    (format!("#pk = :pk AND {sort_clause}"), names, values)
}

/// DynamoDB-based store.
///
/// Every call is bounded by `timeout`; a call that exceeds it fails with
/// [`StoreError::Timeout`].
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
    timeout: Duration,
}

impl DynamoDbStore {
    /// Creates a store with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            timeout,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Deletes up to [`BATCH_SIZE`] items in one call. Unprocessed items are
    /// reported, not retried.
    async fn write_batch(&self, requests: Vec<WriteRequest>) -> StoreResult<()> {
        let count = requests.len();
        let output = bounded(self.timeout, async {
            self.client
                .batch_write_item()
                .request_items(&self.table_name, requests)
                .send()
                .await
                .map_err(map_batch_write_error)
        })
        .await?;

        let unprocessed = output
            .unprocessed_items
            .and_then(|mut unprocessed| unprocessed.remove(&self.table_name))
            .map_or(0, |requests| requests.len());
        if unprocessed > 0 {
            tracing::warn!(unprocessed, requested = count, "batch write left items unprocessed");
            return Err(StoreError::Unavailable(format!(
                "{unprocessed} of {count} deletes left unprocessed"
            )));
        }

        tracing::debug!(deleted = count, "batch delete");
        Ok(())
    }
}

#[async_trait]
impl ItemStore for DynamoDbStore {
    async fn get_item(&self, key: &KeyPair) -> StoreResult<Option<Item>> {
        let output = bounded(self.timeout, async {
            self.client
                .get_item()
                .table_name(&self.table_name)
                .set_key(Some(raw_key(key)))
                .consistent_read(true)
                .send()
                .await
                .map_err(map_get_item_error)
        })
        .await?;

        output.item.as_ref().map(from_raw_item).transpose()
    }

    async fn put_item(&self, item: Item, condition: PutCondition) -> StoreResult<()> {
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_raw_item(&item)));
        if condition == PutCondition::KeyAbsent {
            request = request.condition_expression("attribute_not_exists(PK)");
        }

        bounded(self.timeout, async {
            request.send().await.map_err(map_put_item_error)
        })
        .await?;
        Ok(())
    }

    async fn query(&self, query: &KeyQuery) -> StoreResult<Vec<Item>> {
        let (expression, names, values) = key_condition(query);
        let mut items = Vec::new();
        let mut start_key: Option<RawItem> = None;

        loop {
            let request = self
                .client
                .query()
                .table_name(&self.table_name)
                .set_index_name(query.index.name().map(str::to_string))
                .key_condition_expression(&expression)
                .set_expression_attribute_names(Some(names.clone()))
                .set_expression_attribute_values(Some(values.clone()))
                .set_exclusive_start_key(start_key.take());

            let page = bounded(self.timeout, async {
                request.send().await.map_err(map_query_error)
            })
            .await?;

            for raw in page.items.unwrap_or_default() {
                items.push(from_raw_item(&raw)?);
            }

            match page.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn update_item(&self, key: &KeyPair, update: &ItemUpdate) -> StoreResult<Item> {
        let expression = UpdateExpression::from_update(update)?;
        let request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(raw_key(key)))
            .update_expression(expression.update)
            .condition_expression(expression.condition)
            .set_expression_attribute_names(Some(expression.names))
            .set_expression_attribute_values(
                (!expression.values.is_empty()).then_some(expression.values),
            )
            .return_values(ReturnValue::AllNew);

        let output = bounded(self.timeout, async {
            request.send().await.map_err(map_update_item_error)
        })
        .await?;

        let attributes = output
            .attributes
            .ok_or_else(|| StoreError::Malformed("update returned no attributes".to_string()))?;
        from_raw_item(&attributes)
    }

    async fn delete_item(&self, key: &KeyPair) -> StoreResult<()> {
        bounded(self.timeout, async {
            self.client
                .delete_item()
                .table_name(&self.table_name)
                .set_key(Some(raw_key(key)))
                .send()
                .await
                .map_err(map_delete_item_error)
        })
        .await?;
        Ok(())
    }

    async fn batch_delete(&self, keys: &[KeyPair]) -> StoreResult<()> {
        for chunk in keys.chunks(BATCH_SIZE) {
            let requests = chunk
                .iter()
                .map(|key| {
                    let delete = DeleteRequest::builder()
                        .set_key(Some(raw_key(key)))
                        .build()
                        .map_err(|e| StoreError::Malformed(e.to_string()))?;
                    Ok(WriteRequest::builder().delete_request(delete).build())
                })
                .collect::<StoreResult<Vec<_>>>()?;

            self.write_batch(requests).await?;
        }
        Ok(())
    }
}
