//! DynamoDB storage backend.
//!
//! [`DynamoDbStore`] implements [`ItemStore`](super::store::ItemStore) with
//! `aws-sdk-dynamodb`; [`deploy`] provisions the table it expects.

mod attributes;
pub mod deploy;
mod error;
mod store;

use aws_sdk_dynamodb::Client;

pub use store::DynamoDbStore;

use crate::config::Config;

/// Creates a DynamoDB client for the configured region and endpoint.
pub async fn connect(config: &Config) -> Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    Client::new(&loader.load().await)
}

/// Connects and builds a store for the configured table.
pub async fn store_from_config(config: &Config) -> DynamoDbStore {
    DynamoDbStore::new(connect(config).await, &config.table_name, config.store_timeout)
}
