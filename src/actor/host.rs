//! ActorHost Actor - owns one live actor instance
//!
//! Tasks arrive as `Execute` messages and run one at a time against the
//! instance. Every outcome, including application errors and panics, is written
//! to the object store. Tasks still queued when the host stops are written as
//! failed values in `post_stop`, so waiting readers are always released.

use std::{collections::HashMap, sync::Arc, time::SystemTime};

use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use tokio::sync::Mutex;
use tracing::{Level, event};

use crate::{
    actor::message::{ActorHostMessage, HostHealth},
    domain::{
        constant::actor_host,
        descriptor::{ActorInstance, TypeDescriptor},
        id::{ActorId, ObjectId},
        task::TaskInvocation,
        value::ObjectValue
    },
    port::store::ObjectStore
};

/// Return ids cast to a host but not yet written, keyed to the method that owns them
pub type PendingReturns = Arc<Mutex<HashMap<ObjectId, String>>>;

const STOPPED_REASON: &str = "actor was stopped before the task ran";

/// ActorHost State - the instance plus execution counters
pub struct ActorHostState {
    actor_id:       ActorId,
    descriptor:     Arc<TypeDescriptor>,
    instance:       ActorInstance,
    store:          Arc<dyn ObjectStore>,
    pending:        PendingReturns,
    tasks_executed: u64,
    tasks_failed:   u64,
    startup_time:   SystemTime
}

/// ActorHost Actor - executes tasks against a single actor instance
pub struct ActorHost;

#[async_trait::async_trait]
impl Actor for ActorHost {
    type Arguments = (ActorId, Arc<TypeDescriptor>, Arc<dyn ObjectStore>, PendingReturns);
    type Msg = ActorHostMessage;
    type State = ActorHostState;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        (actor_id, descriptor, store, pending): Self::Arguments
    ) -> Result<Self::State, ActorProcessingErr> {
        event!(Level::DEBUG, event = actor_host::HOST_STARTED,
               actor_id = %actor_id, type_name = %descriptor.unique_name());

        let instance = descriptor.instantiate();

        Ok(ActorHostState {
            actor_id,
            descriptor,
            instance,
            store,
            pending,
            tasks_executed: 0,
            tasks_failed: 0,
            startup_time: SystemTime::now()
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State
    ) -> Result<(), ActorProcessingErr> {
        match message {
            ActorHostMessage::Execute { invocation, return_ids } => {
                self.handle_execute(invocation, return_ids, state).await
            }
            ActorHostMessage::HealthCheck { reply } => self.handle_health_check(reply, state).await
        }
    }

    async fn post_stop(&self, _myself: ActorRef<Self::Msg>, state: &mut Self::State) -> Result<(), ActorProcessingErr> {
        let abandoned: Vec<(ObjectId, String)> = state.pending.lock().await.drain().collect();

        for (id, method) in &abandoned {
            event!(Level::DEBUG, event = actor_host::TASK_ABANDONED,
                   actor_id = %state.actor_id, method = %method, object_id = %id);
            if let Err(e) = state.store.put(id.clone(), ObjectValue::failed(method.clone(), STOPPED_REASON)).await {
                event!(Level::ERROR, event = actor_host::RESULT_STORE_FAILED,
                       actor_id = %state.actor_id, object_id = %id, error = %e);
            }
        }

        event!(Level::DEBUG, event = actor_host::HOST_STOPPED, actor_id = %state.actor_id,
               tasks_executed = state.tasks_executed, tasks_abandoned = abandoned.len());
        Ok(())
    }
}

impl ActorHost {
    async fn handle_execute(
        &self,
        invocation: TaskInvocation,
        return_ids: Vec<ObjectId>,
        state: &mut ActorHostState
    ) -> Result<(), ActorProcessingErr> {
        let outcome = match state.descriptor.method(&invocation.method) {
            Ok(method) => method.invoke(state.instance.as_mut(), &invocation.args),
            Err(e) => Err(e.to_string())
        };

        let value = match outcome {
            Ok(payload) => {
                state.tasks_executed += 1;
                event!(Level::DEBUG, event = actor_host::TASK_EXECUTED,
                       actor_id = %state.actor_id, method = %invocation.method, task_id = %invocation.task_id);
                ObjectValue::Ready(payload)
            }
            Err(message) => {
                state.tasks_failed += 1;
                event!(Level::WARN, event = actor_host::TASK_FAILED,
                       actor_id = %state.actor_id, method = %invocation.method, error = %message);
                ObjectValue::failed(invocation.method.clone(), message)
            }
        };

        for id in return_ids {
            if let Err(e) = state.store.put(id.clone(), value.clone()).await {
                event!(Level::ERROR, event = actor_host::RESULT_STORE_FAILED,
                       actor_id = %state.actor_id, object_id = %id, error = %e);
            }
            state.pending.lock().await.remove(&id);
        }

        Ok(())
    }

    async fn handle_health_check(
        &self,
        reply: RpcReplyPort<HostHealth>,
        state: &mut ActorHostState
    ) -> Result<(), ActorProcessingErr> {
        let health = HostHealth {
            actor_id:       state.actor_id.clone(),
            type_name:      state.descriptor.unique_name().to_string(),
            tasks_executed: state.tasks_executed,
            tasks_failed:   state.tasks_failed,
            uptime_seconds: state.startup_time.elapsed().unwrap_or_default().as_secs()
        };

        event!(Level::DEBUG, event = actor_host::HEALTH_CHECK_COMPLETED,
               actor_id = %state.actor_id, tasks_executed = %health.tasks_executed);

        if let Err(e) = reply.send(health) {
            event!(Level::ERROR, event = actor_host::HEALTH_CHECK_COMPLETED, error = %e);
        }

        Ok(())
    }
}
