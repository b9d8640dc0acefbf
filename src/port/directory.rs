use std::net::IpAddr;

use async_trait::async_trait;

use crate::domain::{
    error::InvokeError,
    id::JobId,
    session::{ClusterAddress, Credentials, NodeInfo}
};

/// Key under which the cluster publishes the session directory
pub const SESSION_DIR_KEY: &str = "session_dir";

/// Port for the cluster directory / control-plane service
#[async_trait]
pub trait ClusterDirectory: Send + Sync {
    /// Connect to the directory service. Must succeed before any other call.
    async fn connect(&self, address: &ClusterAddress, credentials: &Credentials) -> Result<(), InvokeError>;

    /// Allocate the job identity of this driver
    async fn next_job_id(&self) -> Result<JobId, InvokeError>;

    /// Read a value from the cluster's internal key/value table
    async fn internal_kv(&self, key: &str) -> Result<Option<String>, InvokeError>;

    /// Find the node a driver running on `node_ip` should attach to
    async fn node_for_driver(&self, node_ip: IpAddr) -> Result<NodeInfo, InvokeError>;
}
