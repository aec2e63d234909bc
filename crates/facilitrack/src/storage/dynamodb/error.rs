//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to [`StoreError`]. Throttling, server errors and
//! transport failures become `Unavailable`; everything else the service
//! refused becomes `Rejected`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;

use crate::storage::store::StoreError;

const THROTTLED: &str = "throughput exceeded, please retry";
const INTERNAL: &str = "DynamoDB internal server error";
const TABLE_NOT_FOUND: &str = "table not found";

fn unavailable(msg: &str) -> StoreError {
    StoreError::Unavailable(msg.to_string())
}

/// Failures that never reached the service.
fn transport_error<E, R>(err: &SdkError<E, R>) -> Option<StoreError> {
    match err {
        SdkError::TimeoutError(_) => Some(unavailable("request timed out")),
        SdkError::DispatchFailure(_) => Some(unavailable("could not reach DynamoDB")),
        _ => None,
    }
}

/// Map a GetItem SDK error to StoreError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> StoreError {
    if let Some(err) = transport_error(&err) {
        return err;
    }
    match err.into_service_error() {
        GetItemError::ProvisionedThroughputExceededException(_)
        | GetItemError::RequestLimitExceeded(_) => unavailable(THROTTLED),
        GetItemError::InternalServerError(_) => unavailable(INTERNAL),
        GetItemError::ResourceNotFoundException(_) => {
            StoreError::Rejected(TABLE_NOT_FOUND.to_string())
        }
        err => StoreError::Rejected(format!("GetItem failed: {err:?}")),
    }
}

/// Map a Query SDK error to StoreError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> StoreError {
    if let Some(err) = transport_error(&err) {
        return err;
    }
    match err.into_service_error() {
        QueryError::ProvisionedThroughputExceededException(_)
        | QueryError::RequestLimitExceeded(_) => unavailable(THROTTLED),
        QueryError::InternalServerError(_) => unavailable(INTERNAL),
        QueryError::ResourceNotFoundException(_) => {
            StoreError::Rejected(TABLE_NOT_FOUND.to_string())
        }
        err => StoreError::Rejected(format!("Query failed: {err:?}")),
    }
}

/// Map a PutItem SDK error to StoreError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
) -> StoreError {
    if let Some(err) = transport_error(&err) {
        return err;
    }
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => StoreError::ConditionFailed,
        PutItemError::ProvisionedThroughputExceededException(_)
        | PutItemError::RequestLimitExceeded(_)
        | PutItemError::TransactionConflictException(_) => unavailable(THROTTLED),
        PutItemError::InternalServerError(_) => unavailable(INTERNAL),
        PutItemError::ResourceNotFoundException(_) => {
            StoreError::Rejected(TABLE_NOT_FOUND.to_string())
        }
        err => StoreError::Rejected(format!("PutItem failed: {err:?}")),
    }
}

/// Map an UpdateItem SDK error to StoreError.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
) -> StoreError {
    if let Some(err) = transport_error(&err) {
        return err;
    }
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(_) => StoreError::ConditionFailed,
        UpdateItemError::ProvisionedThroughputExceededException(_)
        | UpdateItemError::RequestLimitExceeded(_)
        | UpdateItemError::TransactionConflictException(_) => unavailable(THROTTLED),
        UpdateItemError::InternalServerError(_) => unavailable(INTERNAL),
        UpdateItemError::ResourceNotFoundException(_) => {
            StoreError::Rejected(TABLE_NOT_FOUND.to_string())
        }
        err => StoreError::Rejected(format!("UpdateItem failed: {err:?}")),
    }
}

/// Map a DeleteItem SDK error to StoreError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
) -> StoreError {
    if let Some(err) = transport_error(&err) {
        return err;
    }
    match err.into_service_error() {
        DeleteItemError::ConditionalCheckFailedException(_) => StoreError::ConditionFailed,
        DeleteItemError::ProvisionedThroughputExceededException(_)
        | DeleteItemError::RequestLimitExceeded(_)
        | DeleteItemError::TransactionConflictException(_) => unavailable(THROTTLED),
        DeleteItemError::InternalServerError(_) => unavailable(INTERNAL),
        DeleteItemError::ResourceNotFoundException(_) => {
            StoreError::Rejected(TABLE_NOT_FOUND.to_string())
        }
        err => StoreError::Rejected(format!("DeleteItem failed: {err:?}")),
    }
}

/// Map a BatchWriteItem SDK error to StoreError.
pub fn map_batch_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchWriteItemError, R>,
) -> StoreError {
    if let Some(err) = transport_error(&err) {
        return err;
    }
    match err.into_service_error() {
        BatchWriteItemError::ProvisionedThroughputExceededException(_)
        | BatchWriteItemError::RequestLimitExceeded(_) => unavailable(THROTTLED),
        BatchWriteItemError::InternalServerError(_) => unavailable(INTERNAL),
        BatchWriteItemError::ResourceNotFoundException(_) => {
            StoreError::Rejected(TABLE_NOT_FOUND.to_string())
        }
        err => StoreError::Rejected(format!("BatchWriteItem failed: {err:?}")),
    }
}
