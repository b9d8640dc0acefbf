//! In-process cluster
//!
//! Hosts every actor as an [`ActorHost`] Ractor actor in the current process. Tasks
//! are cast to the host's mailbox, so tasks submitted to one actor run in
//! submission order, and results are written to the shared object store.
//!
//! Return ids are recorded as pending before a task is cast. Stopping an actor
//! waits for its host to exit, and the host fails every id still pending, so a
//! reader never waits on a task that was dropped from a stopped mailbox.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use ractor::{
    Actor, ActorRef,
    rpc::{CallResult, call}
};
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{Level, event};

use crate::{
    actor::{
        host::{ActorHost, PendingReturns},
        message::{ActorHostMessage, HostHealth}
    },
    domain::{
        constant::local_cluster,
        descriptor::TypeDescriptor,
        error::InvokeError,
        id::{ActorId, Language, ObjectId},
        registry::TypeRegistry,
        task::{ActorCreationRequest, DEFAULT_NUM_RETURNS, TaskInvocation}
    },
    port::{cluster::ClusterClient, store::ObjectStore}
};

/// Default upper bound on concurrently hosted actors
pub const DEFAULT_MAX_ACTORS: usize = 1024;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

struct HostedActor {
    actor_ref: ActorRef<ActorHostMessage>,
    /// Completes once the host has run `post_stop`
    handle:    JoinHandle<()>,
    pending:   PendingReturns,
    /// (namespace, name) of a named actor
    name:      Option<(String, String)>
}

impl HostedActor {
    async fn stop(self) {
        self.actor_ref.stop(None);
        if let Err(e) = self.handle.await {
            event!(Level::ERROR, event = local_cluster::ACTOR_KILLED, actor_id = %self.actor_ref.get_id(), error = %e);
        }
    }
}

#[derive(Default)]
struct Placement {
    actors: HashMap<ActorId, HostedActor>,
    names:  HashMap<(String, String), ActorId>
}

impl Placement {
    fn admit(&self, request: &ActorCreationRequest, name: Option<&(String, String)>, max_actors: usize) -> Result<(), InvokeError> {
        if self.actors.len() >= max_actors {
            return Err(creation_failed(request, format!("cluster is at capacity ({} actors)", max_actors)));
        }
        if let Some(key) = name {
            if self.names.contains_key(key) {
                return Err(creation_failed(request, format!("an actor named `{}` already exists", key.1)));
            }
        }
        Ok(())
    }
}

/// Cluster collaborator running all actors inside this process
pub struct LocalCluster {
    /// Types this "worker" knows how to instantiate
    registry:   Arc<TypeRegistry>,
    /// Where hosts write task results
    store:      Arc<dyn ObjectStore>,
    placement:  Arc<RwLock<Placement>>,
    max_actors: usize
}

impl LocalCluster {
    pub fn new(registry: Arc<TypeRegistry>, store: Arc<dyn ObjectStore>, max_actors: usize) -> Self {
        Self { registry, store, placement: Arc::new(RwLock::new(Placement::default())), max_actors }
    }

    /// Number of live actors
    pub async fn actor_count(&self) -> usize {
        self.placement.read().await.actors.len()
    }

    /// Stop an actor and wait for it to exit. Later submissions to it are
    /// rejected; tasks it had not run yet resolve to failed values.
    pub async fn kill_actor(&self, actor_id: &ActorId) -> bool {
        let hosted = {
            let mut placement = self.placement.write().await;
            let hosted = placement.actors.remove(actor_id);
            if let Some(key) = hosted.as_ref().and_then(|hosted| hosted.name.as_ref()) {
                placement.names.remove(key);
            }
            hosted
        };

        match hosted {
            Some(hosted) => {
                hosted.stop().await;
                event!(Level::DEBUG, event = local_cluster::ACTOR_KILLED, actor_id = %actor_id);
                true
            }
            None => false
        }
    }

    /// Execution statistics of a hosted actor
    pub async fn health(&self, actor_id: &ActorId) -> Result<HostHealth, InvokeError> {
        let actor_ref = {
            let placement = self.placement.read().await;
            placement.actors.get(actor_id).map(|hosted| hosted.actor_ref.clone())
        }
        .ok_or_else(|| health_failed(actor_id, "actor is unknown to the cluster"))?;

        match call(&actor_ref, |reply| ActorHostMessage::HealthCheck { reply }, Some(HEALTH_CHECK_TIMEOUT)).await {
            Ok(CallResult::Success(health)) => Ok(health),
            Ok(CallResult::Timeout) => Err(health_failed(actor_id, "health check timed out")),
            Ok(_) => Err(health_failed(actor_id, "health check reply was dropped")),
            Err(e) => Err(health_failed(actor_id, &e.to_string()))
        }
    }
}

fn creation_failed(request: &ActorCreationRequest, reason: impl Into<String>) -> InvokeError {
    InvokeError::ActorCreationFailed { type_name: request.type_name.clone(), reason: reason.into() }
}

fn submission_failed(invocation: &TaskInvocation, reason: impl Into<String>) -> InvokeError {
    InvokeError::TaskSubmissionFailed {
        actor_id: invocation.actor_id.to_string(),
        method:   invocation.method.clone(),
        reason:   reason.into()
    }
}

fn health_failed(actor_id: &ActorId, reason: &str) -> InvokeError {
    InvokeError::TaskSubmissionFailed {
        actor_id: actor_id.to_string(),
        method:   "health_check".to_string(),
        reason:   reason.to_string()
    }
}

/// Spawn a host and record it in `placement`
///
/// Runs detached from the caller so an abandoned creation still either
/// records the new actor or stops it.
async fn place_actor(
    placement: Arc<RwLock<Placement>>,
    store: Arc<dyn ObjectStore>,
    max_actors: usize,
    request: ActorCreationRequest,
    descriptor: Arc<TypeDescriptor>
) -> Result<ActorId, InvokeError> {
    let name = request
        .options
        .name
        .as_ref()
        .map(|name| (request.options.namespace.clone().unwrap_or_default(), name.clone()));

    if let Err(e) = placement.read().await.admit(&request, name.as_ref(), max_actors) {
        event!(Level::WARN, event = local_cluster::ACTOR_SPAWN_FAILED, type_name = %request.type_name, error = %e);
        return Err(e);
    }

    let actor_id = ActorId::random();
    let pending = PendingReturns::default();

    let (actor_ref, handle) = Actor::spawn(None, ActorHost, (actor_id.clone(), descriptor, store, pending.clone()))
        .await
        .map_err(|e| {
            event!(Level::ERROR, event = local_cluster::ACTOR_SPAWN_FAILED, type_name = %request.type_name, error = %e);
            creation_failed(&request, e.to_string())
        })?;
    let hosted = HostedActor { actor_ref, handle, pending, name };

    let mut placement = placement.write().await;

    // Another creation may have taken the last slot or the name while this one spawned
    if let Err(e) = placement.admit(&request, hosted.name.as_ref(), max_actors) {
        drop(placement);
        hosted.stop().await;
        event!(Level::WARN, event = local_cluster::ACTOR_SPAWN_FAILED, type_name = %request.type_name, error = %e);
        return Err(e);
    }

    if let Some(key) = &hosted.name {
        placement.names.insert(key.clone(), actor_id.clone());
    }
    placement.actors.insert(actor_id.clone(), hosted);

    event!(Level::DEBUG, event = local_cluster::ACTOR_SPAWNED,
           actor_id = %actor_id, type_name = %request.type_name, total_actors = %placement.actors.len());

    Ok(actor_id)
}

#[async_trait]
impl ClusterClient for LocalCluster {
    async fn spawn_actor(&self, request: ActorCreationRequest) -> Result<ActorId, InvokeError> {
        if request.language != Language::Rust {
            return Err(creation_failed(&request, format!("no worker available for language {}", request.language)));
        }

        let descriptor = self
            .registry
            .resolve(&request.type_name)
            .map_err(|_| creation_failed(&request, "type is not registered on any worker"))?;

        let placement = Arc::clone(&self.placement);
        let store = Arc::clone(&self.store);
        let type_name = request.type_name.clone();

        tokio::spawn(place_actor(placement, store, self.max_actors, request, descriptor))
            .await
            .map_err(|e| InvokeError::ActorCreationFailed { type_name, reason: e.to_string() })?
    }

    async fn submit_task(&self, invocation: TaskInvocation) -> Result<Vec<ObjectId>, InvokeError> {
        if invocation.num_returns != DEFAULT_NUM_RETURNS {
            return Err(submission_failed(
                &invocation,
                format!("actor methods return {} object(s), {} requested", DEFAULT_NUM_RETURNS, invocation.num_returns)
            ));
        }

        let placement = self.placement.read().await;

        let Some(hosted) = placement.actors.get(&invocation.actor_id) else {
            event!(Level::WARN, event = local_cluster::TASK_REJECTED,
                   actor_id = %invocation.actor_id, method = %invocation.method);
            return Err(submission_failed(&invocation, "actor is unknown to the cluster"));
        };

        let return_ids: Vec<ObjectId> = (0..invocation.num_returns)
            .map(|index| ObjectId::for_task_return(&invocation.task_id, index as u32))
            .collect();

        let actor_id = invocation.actor_id.clone();
        let method = invocation.method.clone();

        {
            let mut pending = hosted.pending.lock().await;
            for id in &return_ids {
                pending.insert(id.clone(), method.clone());
            }
        }

        if let Err(e) = hosted.actor_ref.cast(ActorHostMessage::Execute { invocation, return_ids: return_ids.clone() }) {
            let mut pending = hosted.pending.lock().await;
            for id in &return_ids {
                pending.remove(id);
            }
            return Err(InvokeError::TaskSubmissionFailed {
                actor_id: actor_id.to_string(),
                method,
                reason: format!("actor is not running: {}", e)
            });
        }

        event!(Level::TRACE, event = local_cluster::TASK_DISPATCHED, actor_id = %actor_id, method = %method);

        Ok(return_ids)
    }

    async fn shutdown(&self) {
        let hosted: Vec<HostedActor> = {
            let mut placement = self.placement.write().await;
            placement.names.clear();
            placement.actors.drain().map(|(_, hosted)| hosted).collect()
        };
        let stopped = hosted.len();

        for hosted in hosted {
            hosted.stop().await;
        }

        event!(Level::DEBUG, event = local_cluster::SHUTDOWN, stopped = %stopped);
    }
}
