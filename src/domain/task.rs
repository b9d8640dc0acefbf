//! Requests sent to the cluster

use serde::{Deserialize, Serialize};

use crate::domain::{
    id::{ActorId, Language, TaskId},
    value::Payload
};

/// Actor methods produce exactly one return object
pub const DEFAULT_NUM_RETURNS: usize = 1;

/// Placement options for a new actor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorCreationOptions {
    /// Optional name, unique within its namespace
    pub name:      Option<String>,
    /// Namespace of a named actor; `None` is the default namespace
    pub namespace: Option<String>
}

/// A remote "spawn actor" request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorCreationRequest {
    /// Unique name of the registered implementation type
    pub type_name: String,
    /// Language of the implementation
    pub language:  Language,
    pub options:   ActorCreationOptions
}

/// An in-flight method invocation against an actor
///
/// Built per call and consumed by submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInvocation {
    pub task_id:     TaskId,
    pub actor_id:    ActorId,
    pub method:      String,
    pub args:        Vec<Payload>,
    pub num_returns: usize
}
