//! Single-table storage.
//!
//! Every entity lives in one table addressed by composite keys (see
//! [`keys`]). [`TableRepository`] implements the repository traits of
//! `facilitrack_core::storage` on top of an [`ItemStore`](store::ItemStore),
//! of which there are two:
//!
//! - [`InMemoryStore`]: always available, used by tests and `--store memory`
//! - [`DynamoDbStore`](dynamodb::DynamoDbStore): behind the `dynamodb` feature (default)
//!
//! Build without DynamoDB:
//! ```bash
//! cargo build -p facilitrack --no-default-features
//! ```

pub mod conversions;
pub mod inmemory;
pub mod keys;
pub mod repository;
pub mod store;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

pub use inmemory::InMemoryStore;
pub use repository::TableRepository;
