//! Runtime bootstrap
//!
//! Connects to the cluster directory, resolves the session this driver joins
//! and wires the collaborators every creator, handle and reference shares. Any
//! failure aborts initialization; there is no partially connected runtime.

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    sync::Arc
};

use tracing::{Level, event};

use crate::{
    adapter::{
        directory::StaticDirectory,
        local_cluster::LocalCluster,
        network::{FixedResolver, UdpProbeResolver},
        object_store::InMemoryObjectStore
    },
    config::RuntimeConfig,
    domain::{
        constant::bootstrap,
        error::InvokeError,
        id::{Language, WorkerType},
        registry::TypeRegistry,
        session::SessionInfo
    },
    port::{
        cluster::ClusterClient,
        directory::{ClusterDirectory, SESSION_DIR_KEY},
        network::NodeAddressResolver,
        store::ObjectStore
    },
    runtime::handle::{ActorCreator, ClusterContext}
};

/// The collaborators a runtime is built from
#[derive(Clone)]
pub struct Backends {
    pub directory: Arc<dyn ClusterDirectory>,
    pub cluster:   Arc<dyn ClusterClient>,
    pub store:     Arc<dyn ObjectStore>,
    pub resolver:  Arc<dyn NodeAddressResolver>
}

impl Backends {
    /// In-process collaborators: a static directory, a ractor-backed cluster and
    /// an in-memory object store
    ///
    /// Without a configured `node_ip_address` the driver's address is discovered
    /// by probing the routing table; the single-node directory accepts whatever
    /// address that yields.
    pub fn local(config: &RuntimeConfig, registry: Arc<TypeRegistry>) -> Self {
        let node_ip = config.node_ip_address.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
        let resolver: Arc<dyn NodeAddressResolver> = match config.node_ip_address {
            Some(ip) => Arc::new(FixedResolver(ip)),
            None => Arc::new(UdpProbeResolver::default())
        };

        Self {
            directory: Arc::new(StaticDirectory::single_node(&config.session_dir, node_ip).with_password(config.password.clone())),
            cluster: Arc::new(LocalCluster::new(registry, store.clone(), config.max_actors)),
            store,
            resolver
        }
    }
}

/// A connected driver
pub struct Runtime {
    session:  SessionInfo,
    registry: Arc<TypeRegistry>,
    context:  Arc<ClusterContext>
}

impl Runtime {
    pub async fn init(config: &RuntimeConfig, registry: Arc<TypeRegistry>, backends: Backends) -> Result<Self, InvokeError> {
        match Self::connect(config, &backends).await {
            Ok(session) => {
                event!(Level::INFO, event = bootstrap::CONNECTED, job_id = %session.job_id,
                       gcs_address = %session.gcs_address, node_id = %session.node.node_id,
                       node_ip = %session.node_ip, session_dir = %session.session_dir.display(),
                       driver_name = %session.driver_name, types = registry.len());

                let context = ClusterContext {
                    cluster:     backends.cluster,
                    store:       backends.store,
                    get_timeout: config.get_timeout()
                };
                Ok(Self { session, registry, context: Arc::new(context) })
            }
            Err(e) => {
                event!(Level::ERROR, event = bootstrap::FAILED, address = %config.address, error = %e);
                Err(e)
            }
        }
    }

    /// Boot against the in-process collaborators from [`Backends::local`]
    pub async fn local(config: &RuntimeConfig, registry: Arc<TypeRegistry>) -> Result<Self, InvokeError> {
        let backends = Backends::local(config, registry.clone());
        Self::init(config, registry, backends).await
    }

    async fn connect(config: &RuntimeConfig, backends: &Backends) -> Result<SessionInfo, InvokeError> {
        let gcs_address = config.cluster_address()?;

        event!(Level::INFO, event = bootstrap::CONNECTING, address = %gcs_address, driver_name = %config.driver_name);
        backends.directory.connect(&gcs_address, &config.credentials()).await.map_err(|e| match e {
            InvokeError::ConnectionFailed { .. } => e,
            other => InvokeError::ConnectionFailed { address: gcs_address.to_string(), reason: other.to_string() }
        })?;

        let job_id = backends.directory.next_job_id().await?;

        let session_dir = match backends.directory.internal_kv(SESSION_DIR_KEY).await? {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => {
                return Err(InvokeError::SessionUnavailable(format!(
                    "cluster did not publish `{}`",
                    SESSION_DIR_KEY
                )));
            }
        };
        let log_dir = session_dir.join("logs");
        event!(Level::DEBUG, event = bootstrap::SESSION_RESOLVED, job_id = %job_id, session_dir = %session_dir.display());

        let node_ip = match config.node_ip_address {
            Some(ip) => ip,
            None => backends.resolver.local_ip().await?
        };
        let node = backends.directory.node_for_driver(node_ip).await?;
        event!(Level::DEBUG, event = bootstrap::NODE_RESOLVED, node_id = %node.node_id, node_ip = %node_ip,
               node_manager = %node.node_manager_address, node_manager_port = node.node_manager_port);

        Ok(SessionInfo {
            job_id,
            session_dir,
            log_dir,
            node_ip,
            node,
            gcs_address,
            driver_name: config.driver_name.clone(),
            worker_type: WorkerType::Driver,
            language: Language::Rust
        })
    }

    pub fn session(&self) -> &SessionInfo {
        &self.session
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Prepare the creation of an actor of `type_name`; fails with `UnknownType` before any I/O
    pub fn actor(&self, type_name: &str) -> Result<ActorCreator, InvokeError> {
        let descriptor = self.registry.resolve(type_name)?;
        Ok(ActorCreator::new(descriptor, self.context.clone()))
    }

    pub async fn shutdown(self) {
        self.context.cluster.shutdown().await;
        event!(Level::INFO, event = bootstrap::SHUTDOWN, job_id = %self.session.job_id);
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("session", &self.session)
            .field("types", &self.registry.type_names())
            .finish()
    }
}
