//! Runtime - the client-facing invocation surface
//!
//! [`Runtime`] connects a driver to its session; [`ActorCreator`] and
//! [`ActorHandle`] create and address remote actors; [`TaskCaller`] submits
//! method calls; [`ObjectRef`] waits on their results.

pub mod bootstrap;
pub mod caller;
pub mod handle;
pub mod object_ref;

pub use bootstrap::*;
pub use caller::*;
pub use handle::{ActorCreator, ActorHandle};
pub use object_ref::*;

#[cfg(test)]
mod tests {
    use std::{
        net::{IpAddr, Ipv4Addr},
        path::Path,
        sync::{Arc, atomic::Ordering},
        time::Duration
    };

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::{
        adapter::{
            directory::StaticDirectory,
            local_cluster::LocalCluster,
            network::FixedResolver,
            object_store::InMemoryObjectStore
        },
        config::RuntimeConfig,
        domain::{
            error::InvokeError,
            id::{JobId, Language, WorkerType},
            registry::TypeRegistry,
            value::{ObjectValue, Payload}
        },
        port::store::ObjectStore,
        test_support::{CountingCluster, CountingStore, PendingStore, counter_registry}
    };

    const LOCAL_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    fn config() -> RuntimeConfig {
        RuntimeConfig {
            node_ip_address: Some(LOCAL_IP),
            session_dir: "/tmp/actor-invoke-test/session".into(),
            ..RuntimeConfig::default()
        }
    }

    fn directory(config: &RuntimeConfig) -> Arc<StaticDirectory> {
        Arc::new(StaticDirectory::single_node(&config.session_dir, LOCAL_IP).with_password(config.password.clone()))
    }

    async fn stub_runtime(cluster: Arc<CountingCluster>, store: Arc<dyn ObjectStore>) -> Runtime {
        let config = config();
        let backends = Backends {
            directory: directory(&config),
            cluster,
            store,
            resolver: Arc::new(FixedResolver(LOCAL_IP))
        };
        Runtime::init(&config, counter_registry(), backends).await.unwrap()
    }

    async fn local_runtime() -> (Runtime, Arc<LocalCluster>) {
        let config = config();
        let registry = counter_registry();
        let store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
        let cluster = Arc::new(LocalCluster::new(registry.clone(), store.clone(), config.max_actors));
        let backends = Backends {
            directory: directory(&config),
            cluster: cluster.clone(),
            store,
            resolver: Arc::new(FixedResolver(LOCAL_IP))
        };
        (Runtime::init(&config, registry, backends).await.unwrap(), cluster)
    }

    #[tokio::test]
    async fn test_bootstrap_assembles_session() {
        let runtime = Runtime::local(&config(), counter_registry()).await.unwrap();
        let session = runtime.session();

        assert_eq!(session.job_id, JobId(1));
        assert_eq!(session.session_dir, Path::new("/tmp/actor-invoke-test/session"));
        assert_eq!(session.log_dir, Path::new("/tmp/actor-invoke-test/session/logs"));
        assert_eq!(session.node_ip, LOCAL_IP);
        assert_eq!(session.node.raylet_socket, Path::new("/tmp/actor-invoke-test/session/sockets/raylet"));
        assert_eq!(session.gcs_address.to_string(), "127.0.0.1:6379");
        assert_eq!(session.driver_name, "RUST");
        assert_eq!(session.worker_type, WorkerType::Driver);
        assert_eq!(session.language, Language::Rust);
        assert!(runtime.registry().contains("Counter"));

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_bootstrap_discovers_node_address() {
        let config = RuntimeConfig { node_ip_address: None, ..config() };
        let runtime = Runtime::local(&config, counter_registry()).await.unwrap();
        let session = runtime.session();

        assert!(!session.node_ip.is_unspecified());
        assert_eq!(session.node.node_id, "local");

        let handle = runtime.actor("Counter").unwrap().remote().await.unwrap();
        let value = handle.task("Get").unwrap().remote().await.unwrap();
        assert_eq!(value.get().await.unwrap()[0].get::<i64>().unwrap(), 0);

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_bad_credentials() {
        let config = config();
        let backends = Backends::local(&config, counter_registry());
        let wrong = RuntimeConfig { password: "wrong".to_string(), ..config };

        let result = Runtime::init(&wrong, counter_registry(), backends).await;
        assert!(matches!(result, Err(InvokeError::ConnectionFailed { .. })));
    }

    #[tokio::test]
    async fn test_bootstrap_requires_session_dir() {
        let config = config();
        let backends = Backends {
            directory: Arc::new(StaticDirectory::new()),
            cluster:   Arc::new(CountingCluster::default()),
            store:     Arc::new(InMemoryObjectStore::new()),
            resolver:  Arc::new(FixedResolver(LOCAL_IP))
        };

        let result = Runtime::init(&config, counter_registry(), backends).await;
        assert!(matches!(result, Err(InvokeError::SessionUnavailable(_))));
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_malformed_address() {
        let config = RuntimeConfig { address: "localhost".to_string(), ..config() };
        let backends = Backends::local(&config, counter_registry());

        let result = Runtime::init(&config, counter_registry(), backends).await;
        assert!(matches!(result, Err(InvokeError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_unknown_type_makes_no_cluster_call() {
        let cluster = Arc::new(CountingCluster::default());
        let runtime = stub_runtime(cluster.clone(), Arc::new(InMemoryObjectStore::new())).await;

        let error = runtime.actor("Gauge").unwrap_err();
        assert_eq!(error, InvokeError::UnknownType("Gauge".to_string()));
        assert!(error.is_local());
        assert_eq!(cluster.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_method_fails_before_submission() {
        let cluster = Arc::new(CountingCluster::default());
        let runtime = stub_runtime(cluster.clone(), Arc::new(InMemoryObjectStore::new())).await;
        let handle = runtime.actor("Counter").unwrap().remote().await.unwrap();

        let error = handle.task("Decrease").unwrap_err();
        assert_eq!(
            error,
            InvokeError::MethodNotFound { type_name: "Counter".to_string(), method: "Decrease".to_string() }
        );
        assert!(error.is_local());
        assert_eq!(cluster.spawns.load(Ordering::SeqCst), 1);
        assert_eq!(cluster.submissions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_twice_fetches_once() {
        let cluster = Arc::new(CountingCluster::default());
        let store = Arc::new(CountingStore::default());
        let runtime = stub_runtime(cluster, store.clone()).await;
        let handle = runtime.actor("Counter").unwrap().remote().await.unwrap();

        let object_ref = handle.task("Get").unwrap().remote().await.unwrap();
        store.inner.put(object_ref.ids()[0].clone(), ObjectValue::Ready(Payload::encode(&4i64).unwrap())).await.unwrap();

        let first = object_ref.get().await.unwrap().to_vec();
        let second = object_ref.get().await.unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(first[0].get::<i64>().unwrap(), 4);
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sequential_calls_observe_submission_order() {
        let (runtime, _cluster) = local_runtime().await;
        let handle = runtime.actor("Counter").unwrap().remote().await.unwrap();

        handle.task("Increase").unwrap().arg(&5i64).unwrap().remote().await.unwrap();
        handle.task("Increase").unwrap().arg(&3i64).unwrap().remote().await.unwrap();
        let total = handle.task("Get").unwrap().remote().await.unwrap();

        let values = total.get().await.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].get::<i64>().unwrap(), 8);
        assert_eq!(total.expected_types(), &["i64"]);
    }

    #[tokio::test]
    async fn test_counter_scenario() {
        let (runtime, _cluster) = local_runtime().await;
        let handle = runtime.actor("Counter").unwrap().remote().await.unwrap();

        let increase = handle.task("Increase").unwrap().arg(&10i64).unwrap().remote().await.unwrap();
        increase.get().await.unwrap();

        let value = handle.task("Get").unwrap().remote().await.unwrap();
        assert_eq!(value.get().await.unwrap()[0].get::<i64>().unwrap(), 10);

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_actor_fails_submission() {
        let (runtime, cluster) = local_runtime().await;
        let handle = runtime.actor("Counter").unwrap().remote().await.unwrap();
        assert!(cluster.kill_actor(handle.id()).await);

        let error = handle.task("Get").unwrap().remote().await.unwrap_err();
        assert!(matches!(error, InvokeError::TaskSubmissionFailed { .. }));
        assert!(!error.is_local());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_fails_queued_calls() {
        let (runtime, _cluster) = local_runtime().await;
        let handle = runtime.actor("Counter").unwrap().remote().await.unwrap();

        handle.task("Sleep").unwrap().arg(&200u64).unwrap().remote().await.unwrap();
        let queued = handle.task("Get").unwrap().remote().await.unwrap();
        runtime.shutdown().await;

        let values = queued.get_timeout(Duration::from_secs(5)).await.unwrap();
        match values[0].get::<i64>() {
            Err(InvokeError::RemoteExecutionFailed { method, message }) => {
                assert_eq!(method, "Get");
                assert!(message.contains("stopped"));
            }
            other => panic!("expected RemoteExecutionFailed, got {:?}", other)
        }
    }

    #[tokio::test]
    async fn test_untyped_call_with_argument_tuple() {
        let (runtime, _cluster) = local_runtime().await;
        let handle = runtime.actor("Counter").unwrap().remote().await.unwrap();
        handle.task("Increase").unwrap().arg(&3i64).unwrap().remote().await.unwrap();

        let caller = handle.task("Scale").unwrap().with_args(&(2i64, 1i64)).unwrap();
        assert_eq!(caller.method(), "Scale");
        assert_eq!(caller.arg_count(), 2);

        let scaled = caller.remote().await.unwrap();
        assert_eq!(scaled.get().await.unwrap()[0].get::<i64>().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_remote_failure_is_a_failed_value() {
        let (runtime, _cluster) = local_runtime().await;
        let handle = runtime.actor("Counter").unwrap().remote().await.unwrap();

        let object_ref = handle.task("Divide").unwrap().arg(&0i64).unwrap().remote().await.unwrap();
        let values = object_ref.get().await.unwrap();

        assert!(!values[0].is_ready());
        assert_eq!(
            values[0].get::<i64>().unwrap_err(),
            InvokeError::RemoteExecutionFailed { method: "Divide".to_string(), message: "division by zero".to_string() }
        );
    }

    #[tokio::test]
    async fn test_typed_method_reference() {
        const INCREASE: Method<(i64,), ()> = Method::new("Increase");
        const GET: Method<(), i64> = Method::new("Get");
        const GET_AS_TEXT: Method<(), String> = Method::new("Get");
        const INCREASE_BY_TEXT: Method<(String,), ()> = Method::new("Increase");

        let (runtime, _cluster) = local_runtime().await;
        let handle = runtime.actor("Counter").unwrap().remote().await.unwrap();

        handle.method(&INCREASE).unwrap().remote((7,)).await.unwrap();
        assert_eq!(handle.method(&GET).unwrap().remote(()).await.unwrap().get().await.unwrap(), 7);

        assert!(matches!(handle.method(&GET_AS_TEXT), Err(InvokeError::TypeMismatch { .. })));
        assert!(matches!(handle.method(&INCREASE_BY_TEXT), Err(InvokeError::TypeMismatch { .. })));
    }

    #[tokio::test]
    async fn test_named_actors_are_unique() {
        let (runtime, _cluster) = local_runtime().await;
        let creator = runtime.actor("Counter").unwrap().named("primary");

        creator.remote().await.unwrap();
        assert!(matches!(creator.remote().await, Err(InvokeError::ActorCreationFailed { .. })));
        runtime.actor("Counter").unwrap().named("primary").namespace("other").remote().await.unwrap();
    }

    #[tokio::test]
    async fn test_configured_timeout_bounds_get() {
        let config = RuntimeConfig { get_timeout_ms: Some(20), ..config() };
        let backends = Backends {
            directory: directory(&config),
            cluster:   Arc::new(CountingCluster::default()),
            store:     Arc::new(PendingStore),
            resolver:  Arc::new(FixedResolver(LOCAL_IP))
        };
        let runtime = Runtime::init(&config, counter_registry(), backends).await.unwrap();
        let handle = runtime.actor("Counter").unwrap().remote().await.unwrap();

        let object_ref = handle.task("Get").unwrap().remote().await.unwrap();
        assert_eq!(object_ref.get().await.unwrap_err(), InvokeError::Timeout(Duration::from_millis(20)));
        assert!(!object_ref.is_resolved());
    }

    #[tokio::test]
    async fn test_cancelled_submission_returns_cancelled() {
        let cluster = Arc::new(CountingCluster::default());
        let runtime = stub_runtime(cluster, Arc::new(InMemoryObjectStore::new())).await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let creator = runtime.actor("Counter").unwrap();
        assert_eq!(creator.remote_cancellable(&cancel).await.unwrap_err(), InvokeError::Cancelled);

        let handle = creator.remote().await.unwrap();
        let caller = handle.task("Get").unwrap();
        assert_eq!(caller.remote_cancellable(&cancel).await.unwrap_err(), InvokeError::Cancelled);
    }

    #[tokio::test]
    async fn test_registry_is_shared_across_tasks() {
        let registry: Arc<TypeRegistry> = counter_registry();
        let runtime = Arc::new(Runtime::local(&config(), registry).await.unwrap());

        let workers: Vec<_> = (0..4)
            .map(|n| {
                let runtime = runtime.clone();
                tokio::spawn(async move {
                    let handle = runtime.actor("Counter")?.remote().await?;
                    handle.task("Increase")?.arg(&(n as i64))?.remote().await?;
                    let value = handle.task("Get")?.remote().await?;
                    value.get().await?[0].get::<i64>()
                })
            })
            .collect();

        for (n, worker) in workers.into_iter().enumerate() {
            assert_eq!(worker.await.unwrap().unwrap(), n as i64);
        }
    }
}
