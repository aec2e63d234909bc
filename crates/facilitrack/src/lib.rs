//! Multi-tenant facility and maintenance task tracker on a single DynamoDB
//! table.
//!
//! - [`storage`]: key codec, item conversions, the store adapter and its
//!   backends, and the repository implementation
//! - [`service`]: authorization and validation in front of the repositories
//! - [`config`]: environment configuration

pub mod config;
pub mod service;
pub mod storage;
