//! Typed messages for actor communication

use ractor::{Message, RpcReplyPort};

use crate::domain::{
    id::{ActorId, ObjectId},
    task::TaskInvocation
};

/// Messages for the ActorHost actor
#[derive(Debug)]
pub enum ActorHostMessage {
    /// Execute a task and write its result under `return_ids`
    Execute { invocation: TaskInvocation, return_ids: Vec<ObjectId> },
    /// Report execution statistics
    HealthCheck { reply: RpcReplyPort<HostHealth> }
}

/// Health information of a hosted actor
#[derive(Debug, Clone)]
pub struct HostHealth {
    pub actor_id:       ActorId,
    pub type_name:      String,
    pub tasks_executed: u64,
    pub tasks_failed:   u64,
    pub uptime_seconds: u64
}

// Implement Message trait for Ractor
impl Message for ActorHostMessage {}
