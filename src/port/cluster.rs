use async_trait::async_trait;

use crate::domain::{
    error::InvokeError,
    id::{ActorId, ObjectId},
    task::{ActorCreationRequest, TaskInvocation}
};

/// Port for actor placement and task dispatch
///
/// Tasks submitted to the same actor must execute in submission order.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Create a remote actor; returns its opaque identity once placed.
    /// Rejections are reported as `ActorCreationFailed`.
    async fn spawn_actor(&self, request: ActorCreationRequest) -> Result<ActorId, InvokeError>;

    /// Dispatch a task; returns the ids of its return objects.
    /// Rejections are reported as `TaskSubmissionFailed`.
    async fn submit_task(&self, invocation: TaskInvocation) -> Result<Vec<ObjectId>, InvokeError>;

    /// Release any resources held for this driver
    async fn shutdown(&self) {}
}
