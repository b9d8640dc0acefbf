use async_trait::async_trait;

use crate::domain::{error::InvokeError, id::ObjectId, value::ObjectValue};

/// Port for the object store holding task results
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Wait until every id is available and return the values in the same order
    async fn get_values(&self, ids: &[ObjectId]) -> Result<Vec<ObjectValue>, InvokeError>;

    /// Write a value. Objects are immutable once written.
    async fn put(&self, id: ObjectId, value: ObjectValue) -> Result<(), InvokeError>;

    /// Release values; later fetches of these ids fail with `ObjectEvicted`
    async fn free(&self, ids: &[ObjectId]) -> Result<(), InvokeError>;
}
