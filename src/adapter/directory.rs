//! Static cluster directory
//!
//! An in-memory stand-in for the cluster control plane: it checks credentials,
//! hands out job ids, serves the internal key/value table and the node table.
//! Used for single-process clusters and tests.

use std::{
    collections::HashMap,
    net::IpAddr,
    path::Path,
    sync::atomic::{AtomicBool, AtomicU32, Ordering}
};

use async_trait::async_trait;
use tracing::{Level, event};

use crate::{
    domain::{
        constant::bootstrap,
        error::InvokeError,
        id::JobId,
        session::{ClusterAddress, Credentials, NodeInfo}
    },
    port::directory::{ClusterDirectory, SESSION_DIR_KEY}
};

#[derive(Debug, Default)]
pub struct StaticDirectory {
    /// Required password, if any
    password:  Option<String>,
    kv:        HashMap<String, String>,
    nodes:     Vec<NodeInfo>,
    next_job:  AtomicU32,
    connected: AtomicBool
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory for a single node rooted at `session_dir`
    pub fn single_node(session_dir: &Path, node_ip: IpAddr) -> Self {
        let sockets = session_dir.join("sockets");
        Self::new().with_session_dir(session_dir).with_node(NodeInfo {
            node_id:              "local".to_string(),
            node_manager_address: node_ip,
            node_manager_port:    0,
            object_store_socket:  sockets.join("plasma_store"),
            raylet_socket:        sockets.join("raylet")
        })
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_kv(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kv.insert(key.into(), value.into());
        self
    }

    pub fn with_session_dir(self, session_dir: &Path) -> Self {
        self.with_kv(SESSION_DIR_KEY, session_dir.to_string_lossy())
    }

    pub fn with_node(mut self, node: NodeInfo) -> Self {
        self.nodes.push(node);
        self
    }

    fn ensure_connected(&self) -> Result<(), InvokeError> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(InvokeError::ConnectionFailed {
                address: "directory".to_string(),
                reason:  "not connected".to_string()
            })
        }
    }
}

#[async_trait]
impl ClusterDirectory for StaticDirectory {
    async fn connect(&self, address: &ClusterAddress, credentials: &Credentials) -> Result<(), InvokeError> {
        if let Some(expected) = &self.password {
            if expected != credentials.password() {
                return Err(InvokeError::ConnectionFailed {
                    address: address.to_string(),
                    reason:  "authentication failed".to_string()
                });
            }
        }

        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn next_job_id(&self) -> Result<JobId, InvokeError> {
        self.ensure_connected()?;
        Ok(JobId(self.next_job.fetch_add(1, Ordering::AcqRel) + 1))
    }

    async fn internal_kv(&self, key: &str) -> Result<Option<String>, InvokeError> {
        self.ensure_connected()?;
        Ok(self.kv.get(key).cloned())
    }

    async fn node_for_driver(&self, node_ip: IpAddr) -> Result<NodeInfo, InvokeError> {
        self.ensure_connected()?;

        if let Some(node) = self.nodes.iter().find(|node| node.node_manager_address == node_ip) {
            return Ok(node.clone());
        }

        match self.nodes.as_slice() {
            [only] => {
                event!(Level::WARN, event = bootstrap::NODE_RESOLVED, driver_ip = %node_ip,
                       node_ip = %only.node_manager_address, message = "no_matching_node_using_only_node");
                Ok(only.clone())
            }
            [] => Err(InvokeError::SessionUnavailable("cluster has no nodes".to_string())),
            _ => Err(InvokeError::SessionUnavailable(format!("no node with address {}", node_ip)))
        }
    }
}
