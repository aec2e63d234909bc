//! Table provisioning.
//!
//! Creates the table with its `PK`/`SK` primary key and the `GSI1` inverse
//! index if it does not exist, then waits until both are active.

use std::time::Duration;

use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, IndexStatus, KeySchemaElement,
    KeyType, Projection, ProjectionType, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;
use thiserror::Error;

use crate::storage::store::{GSI1, GSI1PK, GSI1SK, PK, SK};

const ACTIVATION_ATTEMPTS: u32 = 60;
const ACTIVATION_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
    #[error("table {0} did not become active in time")]
    ActivationTimeout(String),
}

pub type Result<T> = std::result::Result<T, DeployError>;

fn sdk_error(err: impl std::fmt::Display) -> DeployError {
    DeployError::AwsSdk(err.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    Created,
    AlreadyExists,
}

fn key_schema(partition: &str, sort: &str) -> Result<Vec<KeySchemaElement>> {
    [(partition, KeyType::Hash), (sort, KeyType::Range)]
        .into_iter()
        .map(|(name, key_type)| {
            KeySchemaElement::builder()
                .attribute_name(name)
                .key_type(key_type)
                .build()
                .map_err(sdk_error)
        })
        .collect()
}

fn attribute_definitions() -> Result<Vec<AttributeDefinition>> {
    [PK, SK, GSI1PK, GSI1SK]
        .into_iter()
        .map(|name| {
            AttributeDefinition::builder()
                .attribute_name(name)
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(sdk_error)
        })
        .collect()
}

fn inverse_index() -> Result<GlobalSecondaryIndex> {
    GlobalSecondaryIndex::builder()
        .index_name(GSI1)
        .set_key_schema(Some(key_schema(GSI1PK, GSI1SK)?))
        .projection(
            Projection::builder()
                .projection_type(ProjectionType::All)
                .build(),
        )
        .build()
        .map_err(sdk_error)
}

/// Creates `table_name` unless it already exists.
pub async fn ensure_table(client: &Client, table_name: &str) -> Result<DeployOutcome> {
    if table_exists(client, table_name).await? {
        tracing::info!(table = %table_name, "table already exists");
        return Ok(DeployOutcome::AlreadyExists);
    }

    client
        .create_table()
        .table_name(table_name)
        .set_key_schema(Some(key_schema(PK, SK)?))
        .set_attribute_definitions(Some(attribute_definitions()?))
        .global_secondary_indexes(inverse_index()?)
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await
        .map_err(sdk_error)?;

    tracing::info!(table = %table_name, "creating table");
    wait_for_table_active(client, table_name).await?;
    Ok(DeployOutcome::Created)
}

async fn table_exists(client: &Client, table_name: &str) -> Result<bool> {
    match client.describe_table().table_name(table_name).send().await {
        Ok(_) => Ok(true),
        Err(err)
            if err
                .as_service_error()
                .is_some_and(|e| e.is_resource_not_found_exception()) =>
        {
            Ok(false)
        }
        Err(err) => Err(sdk_error(err)),
    }
}

async fn wait_for_table_active(client: &Client, table_name: &str) -> Result<()> {
    for _ in 0..ACTIVATION_ATTEMPTS {
        let output = client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(sdk_error)?;

        if let Some(table) = output.table() {
            let table_active = table.table_status() == Some(&TableStatus::Active);
            let indexes_active = table
                .global_secondary_indexes()
                .iter()
                .all(|gsi| gsi.index_status() == Some(&IndexStatus::Active));
            if table_active && indexes_active {
                tracing::info!(table = %table_name, "table is active");
                return Ok(());
            }
        }
        tokio::time::sleep(ACTIVATION_DELAY).await;
    }

    Err(DeployError::ActivationTimeout(table_name.to_string()))
}
