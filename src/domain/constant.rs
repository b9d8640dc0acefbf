//! Domain Events - Structured event names for tracing

/// Type registry events
pub mod registry {
    pub const TYPE_REGISTERED: &str = "type.registered";
    pub const TYPE_REJECTED: &str = "type.rejected";
    pub const TYPE_UNKNOWN: &str = "type.unknown";
    pub const REGISTRY_FROZEN: &str = "registry.frozen";
}

/// Actor creator events
pub mod creator {
    pub const ACTOR_CREATING: &str = "actor.creating";
    pub const ACTOR_CREATED: &str = "actor.created";
    pub const ACTOR_CREATION_FAILED: &str = "actor.creation_failed";
}

/// Task caller events
pub mod caller {
    pub const METHOD_RESOLVED: &str = "method.resolved";
    pub const METHOD_NOT_FOUND: &str = "method.not_found";
    pub const TASK_SUBMITTED: &str = "task.submitted";
    pub const TASK_SUBMISSION_FAILED: &str = "task.submission_failed";
}

/// Object reference events
pub mod object_ref {
    pub const FETCH_STARTED: &str = "fetch.started";
    pub const FETCH_COMPLETED: &str = "fetch.completed";
    pub const FETCH_ABANDONED: &str = "fetch.abandoned";
}

/// Runtime bootstrap events
pub mod bootstrap {
    pub const CONNECTING: &str = "bootstrap.connecting";
    pub const CONNECTED: &str = "bootstrap.connected";
    pub const SESSION_RESOLVED: &str = "bootstrap.session_resolved";
    pub const NODE_RESOLVED: &str = "bootstrap.node_resolved";
    pub const FAILED: &str = "bootstrap.failed";
    pub const SHUTDOWN: &str = "runtime.shutdown";
}

/// In-process cluster events
pub mod local_cluster {
    pub const ACTOR_SPAWNED: &str = "cluster.actor_spawned";
    pub const ACTOR_SPAWN_FAILED: &str = "cluster.actor_spawn_failed";
    pub const ACTOR_KILLED: &str = "cluster.actor_killed";
    pub const TASK_DISPATCHED: &str = "cluster.task_dispatched";
    pub const TASK_REJECTED: &str = "cluster.task_rejected";
    pub const SHUTDOWN: &str = "cluster.shutdown";
}

/// ActorHost actor events
pub mod actor_host {
    pub const HOST_STARTED: &str = "host.started";
    pub const TASK_EXECUTED: &str = "task.executed";
    pub const TASK_FAILED: &str = "task.failed";
    pub const RESULT_STORE_FAILED: &str = "result.store_failed";
    pub const HEALTH_CHECK_COMPLETED: &str = "health.check_completed";
    pub const HOST_STOPPED: &str = "host.stopped";
    pub const TASK_ABANDONED: &str = "task.abandoned";
}

/// Object store events
pub mod object_store {
    pub const OBJECT_PUT: &str = "object.put";
    pub const OBJECT_FREED: &str = "object.freed";
    pub const OBJECT_WAITING: &str = "object.waiting";
}

/// Driver binary events
pub mod driver {
    pub const INCREASED: &str = "driver.increased";
    pub const COMPLETED: &str = "driver.completed";
}
