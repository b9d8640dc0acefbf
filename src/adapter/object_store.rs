//! In-memory object store
//!
//! Values are keyed by object id and immutable once written. Readers waiting on
//! missing ids are woken through a `watch` version counter bumped on every write
//! or free, so a reader that subscribes before checking never misses an update.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::{RwLock, watch};
use tracing::{Level, event};

use crate::{
    domain::{constant::object_store, error::InvokeError, id::ObjectId, value::ObjectValue},
    port::store::ObjectStore
};

#[derive(Debug)]
pub struct InMemoryObjectStore {
    /// Written values by id
    objects: RwLock<HashMap<ObjectId, ObjectValue>>,
    /// Ids released through `free`
    evicted: RwLock<HashSet<ObjectId>>,
    /// Bumped on every change
    version: watch::Sender<u64>
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self { objects: RwLock::new(HashMap::new()), evicted: RwLock::new(HashSet::new()), version }
    }

    /// Number of values currently held
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn contains(&self, id: &ObjectId) -> bool {
        self.objects.read().await.contains_key(id)
    }

    fn bump(&self) {
        self.version.send_modify(|version| *version += 1);
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_values(&self, ids: &[ObjectId]) -> Result<Vec<ObjectValue>, InvokeError> {
        let mut changes = self.version.subscribe();

        loop {
            {
                let evicted = self.evicted.read().await;
                if let Some(id) = ids.iter().find(|id| evicted.contains(*id)) {
                    return Err(InvokeError::ObjectEvicted(id.to_string()));
                }
            }

            {
                let objects = self.objects.read().await;
                let values: Option<Vec<ObjectValue>> = ids.iter().map(|id| objects.get(id).cloned()).collect();
                if let Some(values) = values {
                    return Ok(values);
                }
            }

            event!(Level::TRACE, event = object_store::OBJECT_WAITING, objects = ids.len());

            changes.changed().await.map_err(|_| InvokeError::Store("object store was dropped".to_string()))?;
        }
    }

    async fn put(&self, id: ObjectId, value: ObjectValue) -> Result<(), InvokeError> {
        {
            // Lock order matches `free`
            let mut objects = self.objects.write().await;
            if self.evicted.read().await.contains(&id) {
                event!(Level::DEBUG, event = object_store::OBJECT_PUT, object_id = %id, message = "discarded_evicted");
                return Ok(());
            }
            if objects.contains_key(&id) {
                return Err(InvokeError::Store(format!("object {} already exists", id)));
            }
            event!(Level::TRACE, event = object_store::OBJECT_PUT, object_id = %id, ready = value.is_ready());
            objects.insert(id, value);
        }

        self.bump();
        Ok(())
    }

    async fn free(&self, ids: &[ObjectId]) -> Result<(), InvokeError> {
        {
            let mut objects = self.objects.write().await;
            let mut evicted = self.evicted.write().await;
            for id in ids {
                objects.remove(id);
                evicted.insert(id.clone());
            }
        }

        event!(Level::DEBUG, event = object_store::OBJECT_FREED, objects = ids.len());
        self.bump();
        Ok(())
    }
}
