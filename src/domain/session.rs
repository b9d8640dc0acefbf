//! Session metadata produced by the runtime bootstrap

use std::{fmt, net::IpAddr, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::InvokeError,
    id::{JobId, Language, WorkerType}
};

/// Entry point of the cluster directory service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAddress {
    pub host: String,
    pub port: u16
}

impl ClusterAddress {
    /// Parse `host:port`
    pub fn parse(address: &str) -> Result<Self, InvokeError> {
        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| InvokeError::Configuration(format!("address `{}` is missing a port", address)))?;

        if host.is_empty() {
            return Err(InvokeError::Configuration(format!("address `{}` is missing a host", address)));
        }

        let port = port
            .parse::<u16>()
            .map_err(|e| InvokeError::Configuration(format!("address `{}` has an invalid port: {}", address, e)))?;

        Ok(Self { host: host.to_string(), port })
    }
}

impl fmt::Display for ClusterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Credentials presented to the cluster directory service
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    password: String
}

impl Credentials {
    pub fn new(password: impl Into<String>) -> Self {
        Self { password: password.into() }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("password", &"<redacted>").finish()
    }
}

/// Node this driver attaches to, as reported by the cluster directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub node_id:              String,
    pub node_manager_address: IpAddr,
    pub node_manager_port:    u16,
    pub object_store_socket:  PathBuf,
    pub raylet_socket:        PathBuf
}

/// Everything a connected driver knows about its session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub job_id:      JobId,
    pub session_dir: PathBuf,
    pub log_dir:     PathBuf,
    pub node_ip:     IpAddr,
    pub node:        NodeInfo,
    pub gcs_address: ClusterAddress,
    pub driver_name: String,
    pub worker_type: WorkerType,
    pub language:    Language
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cluster_address() {
        let address = ClusterAddress::parse("127.0.0.1:6379").unwrap();
        assert_eq!(address.host, "127.0.0.1");
        assert_eq!(address.port, 6379);
        assert_eq!(address.to_string(), "127.0.0.1:6379");
    }

    #[test]
    fn test_parse_rejects_malformed_addresses() {
        for bad in ["127.0.0.1", ":6379", "localhost:http", "localhost:70000"] {
            assert!(matches!(ClusterAddress::parse(bad), Err(InvokeError::Configuration(_))), "{}", bad);
        }
    }

    #[test]
    fn test_credentials_are_redacted() {
        let credentials = Credentials::new("5241590000000000");
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("5241590000000000"));
        assert_eq!(credentials.password(), "5241590000000000");
    }
}
