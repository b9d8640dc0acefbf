//! Object references
//!
//! An [`ObjectRef`] names the pending result(s) of a submitted task. The first
//! successful `get` fetches from the object store and caches the values; every
//! later `get` (on this ref or any clone) returns the cache without another
//! fetch. A wait abandoned through timeout or cancellation leaves the cache
//! empty and does not affect the remote task.

use std::{fmt, marker::PhantomData, sync::Arc, time::Duration};

use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{Level, event};

use crate::{
    domain::{
        constant::object_ref,
        error::InvokeError,
        id::ObjectId,
        value::ObjectValue
    },
    port::store::ObjectStore
};

#[derive(Clone)]
pub struct ObjectRef {
    ids:             Vec<ObjectId>,
    /// Type tag expected for each id, in the same order
    expected_types:  Vec<&'static str>,
    store:           Arc<dyn ObjectStore>,
    cache:           Arc<OnceCell<Vec<ObjectValue>>>,
    default_timeout: Option<Duration>
}

impl ObjectRef {
    pub(crate) fn new(
        ids: Vec<ObjectId>,
        expected_types: Vec<&'static str>,
        store: Arc<dyn ObjectStore>,
        default_timeout: Option<Duration>
    ) -> Self {
        debug_assert_eq!(ids.len(), expected_types.len());
        Self { ids, expected_types, store, cache: Arc::new(OnceCell::new()), default_timeout }
    }

    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    pub fn expected_types(&self) -> &[&'static str] {
        &self.expected_types
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// True once values have been fetched and cached
    pub fn is_resolved(&self) -> bool {
        self.cache.initialized()
    }

    /// Wait for all values, bounded by the configured default timeout if any
    pub async fn get(&self) -> Result<&[ObjectValue], InvokeError> {
        match self.default_timeout {
            Some(timeout) => self.get_timeout(timeout).await,
            None => self.fetch().await
        }
    }

    /// Wait for all values for at most `timeout`
    pub async fn get_timeout(&self, timeout: Duration) -> Result<&[ObjectValue], InvokeError> {
        if let Some(values) = self.cache.get() {
            return Ok(values);
        }

        match tokio::time::timeout(timeout, self.fetch()).await {
            Ok(result) => result,
            Err(_) => {
                event!(Level::DEBUG, event = object_ref::FETCH_ABANDONED, reason = "timeout", objects = self.ids.len());
                Err(InvokeError::Timeout(timeout))
            }
        }
    }

    /// Wait for all values until `cancel` fires
    pub async fn get_cancellable(&self, cancel: &CancellationToken) -> Result<&[ObjectValue], InvokeError> {
        if let Some(values) = self.cache.get() {
            return Ok(values);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                event!(Level::DEBUG, event = object_ref::FETCH_ABANDONED, reason = "cancelled", objects = self.ids.len());
                Err(InvokeError::Cancelled)
            }
            result = self.fetch() => result
        }
    }

    async fn fetch(&self) -> Result<&[ObjectValue], InvokeError> {
        let values = self
            .cache
            .get_or_try_init(|| async {
                event!(Level::DEBUG, event = object_ref::FETCH_STARTED, objects = self.ids.len());

                let values = self.store.get_values(&self.ids).await?;
                if values.len() != self.ids.len() {
                    return Err(InvokeError::Store(format!(
                        "object store returned {} value(s) for {} id(s)",
                        values.len(),
                        self.ids.len()
                    )));
                }

                event!(Level::DEBUG, event = object_ref::FETCH_COMPLETED, objects = values.len(),
                       failed = values.iter().filter(|v| !v.is_ready()).count());
                Ok(values)
            })
            .await?;

        Ok(values.as_slice())
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("ids", &self.ids)
            .field("expected_types", &self.expected_types)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Reference to the single result of a typed call
pub struct TypedObjectRef<R> {
    inner:   ObjectRef,
    _marker: PhantomData<fn() -> R>
}

impl<R: DeserializeOwned> TypedObjectRef<R> {
    pub(crate) fn new(inner: ObjectRef) -> Self {
        Self { inner, _marker: PhantomData }
    }

    pub async fn get(&self) -> Result<R, InvokeError> {
        Self::first(self.inner.get().await?)
    }

    pub async fn get_timeout(&self, timeout: Duration) -> Result<R, InvokeError> {
        Self::first(self.inner.get_timeout(timeout).await?)
    }

    pub async fn get_cancellable(&self, cancel: &CancellationToken) -> Result<R, InvokeError> {
        Self::first(self.inner.get_cancellable(cancel).await?)
    }

    pub fn untyped(&self) -> &ObjectRef {
        &self.inner
    }

    pub fn into_untyped(self) -> ObjectRef {
        self.inner
    }

    fn first(values: &[ObjectValue]) -> Result<R, InvokeError> {
        values
            .first()
            .ok_or_else(|| InvokeError::Store("object reference holds no values".to_string()))?
            .get::<R>()
    }
}

impl<R> Clone for TypedObjectRef<R> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), _marker: PhantomData }
    }
}

impl<R> fmt::Debug for TypedObjectRef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedObjectRef").field(&self.inner).finish()
    }
}
