//! # Actor Invoke
//!
//! Client-side invocation layer for remote, stateful actors hosted by a cluster.
//!
//! This crate provides functionality to:
//! - Register actor implementation types with a method dispatch table
//! - Create remote actors and submit method calls to them
//! - Wait on object references for task results, with timeouts and cancellation
//! - Bootstrap a driver session against a cluster directory service

pub mod actor;
pub mod adapter;
pub mod config;
pub mod domain;
pub mod port;
pub mod runtime;

pub use config::RuntimeConfig;
pub use domain::{
    descriptor::{MethodDescriptor, TypeDescriptor, TypeDescriptorBuilder},
    error::InvokeError,
    registry::TypeRegistry,
    value::{ObjectValue, Payload}
};
pub use runtime::{
    ActorCreator, ActorHandle, Backends, Method, ObjectRef, Runtime, TaskCaller, TypedObjectRef, TypedTaskCaller
};

#[cfg(test)]
pub(crate) mod test_support {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering}
        },
        time::Duration
    };

    use async_trait::async_trait;

    use crate::{
        adapter::object_store::InMemoryObjectStore,
        domain::{
            descriptor::TypeDescriptor,
            error::InvokeError,
            id::{ActorId, ObjectId},
            registry::TypeRegistry,
            task::{ActorCreationRequest, TaskInvocation},
            value::ObjectValue
        },
        port::{cluster::ClusterClient, store::ObjectStore}
    };

    #[derive(Default)]
    pub struct Counter {
        value: i64
    }

    pub fn counter_registry() -> Arc<TypeRegistry> {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                TypeDescriptor::builder::<Counter>("", "Counter")
                    .method("Increase", |c: &mut Counter, (n,): (i64,)| c.value += n)
                    .method("Get", |c: &mut Counter, (): ()| c.value)
                    .method("Scale", |c: &mut Counter, (factor, offset): (i64, i64)| {
                        c.value = c.value * factor + offset;
                        c.value
                    })
                    .method("Sleep", |_: &mut Counter, (ms,): (u64,)| std::thread::sleep(Duration::from_millis(ms)))
                    .fallible_method("Divide", |c: &mut Counter, (d,): (i64,)| {
                        if d == 0 { Err("division by zero") } else { Ok(c.value / d) }
                    })
                    .build()
            )
            .unwrap();
        registry.freeze()
    }

    /// Cluster stub counting calls; spawns always succeed, submissions return one id
    #[derive(Default)]
    pub struct CountingCluster {
        pub spawns:      AtomicUsize,
        pub submissions: AtomicUsize
    }

    impl CountingCluster {
        pub fn calls(&self) -> usize {
            self.spawns.load(Ordering::SeqCst) + self.submissions.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClusterClient for CountingCluster {
        async fn spawn_actor(&self, _request: ActorCreationRequest) -> Result<ActorId, InvokeError> {
            self.spawns.fetch_add(1, Ordering::SeqCst);
            Ok(ActorId::random())
        }

        async fn submit_task(&self, invocation: TaskInvocation) -> Result<Vec<ObjectId>, InvokeError> {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ObjectId::for_task_return(&invocation.task_id, 0)])
        }
    }

    /// Object store wrapper counting fetches
    #[derive(Default)]
    pub struct CountingStore {
        pub inner:   InMemoryObjectStore,
        pub fetches: AtomicUsize
    }

    #[async_trait]
    impl ObjectStore for CountingStore {
        async fn get_values(&self, ids: &[ObjectId]) -> Result<Vec<ObjectValue>, InvokeError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.get_values(ids).await
        }

        async fn put(&self, id: ObjectId, value: ObjectValue) -> Result<(), InvokeError> {
            self.inner.put(id, value).await
        }

        async fn free(&self, ids: &[ObjectId]) -> Result<(), InvokeError> {
            self.inner.free(ids).await
        }
    }

    /// Object store whose values never arrive
    pub struct PendingStore;

    #[async_trait]
    impl ObjectStore for PendingStore {
        async fn get_values(&self, _ids: &[ObjectId]) -> Result<Vec<ObjectValue>, InvokeError> {
            std::future::pending().await
        }

        async fn put(&self, _id: ObjectId, _value: ObjectValue) -> Result<(), InvokeError> {
            Ok(())
        }

        async fn free(&self, _ids: &[ObjectId]) -> Result<(), InvokeError> {
            Ok(())
        }
    }
}
