//! Driver configuration
//!
//! Loaded from YAML. Every field has a default, so a partial file (or no file
//! at all) yields a usable configuration.

use std::{
    fs,
    net::IpAddr,
    path::{Path, PathBuf},
    time::Duration
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{
    adapter::local_cluster::DEFAULT_MAX_ACTORS,
    domain::{
        error::InvokeError,
        session::{ClusterAddress, Credentials}
    }
};

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:6379";
pub const DEFAULT_PASSWORD: &str = "5241590000000000";
pub const DEFAULT_DRIVER_NAME: &str = "RUST";
pub const DEFAULT_SESSION_DIR: &str = "/tmp/ray/session_latest";

const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directory service address, `host:port`
    pub address:         String,
    pub password:        String,
    pub driver_name:     String,
    /// Overrides local address discovery
    pub node_ip_address: Option<IpAddr>,
    /// Default bound applied by `ObjectRef::get`
    pub get_timeout_ms:  Option<u64>,
    /// Session directory served by the in-process directory
    pub session_dir:     PathBuf,
    /// Capacity of the in-process cluster
    pub max_actors:      usize
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            address:         DEFAULT_ADDRESS.to_string(),
            password:        DEFAULT_PASSWORD.to_string(),
            driver_name:     DEFAULT_DRIVER_NAME.to_string(),
            node_ip_address: None,
            get_timeout_ms:  None,
            session_dir:     PathBuf::from(DEFAULT_SESSION_DIR),
            max_actors:      DEFAULT_MAX_ACTORS
        }
    }
}

impl RuntimeConfig {
    /// Load and validate the configuration at `path`
    pub fn load(path: &Path) -> Result<Self, InvokeError> {
        let content = fs::read_to_string(path)
            .map_err(|e| InvokeError::Configuration(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| InvokeError::Configuration(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or from the default location if a file exists there
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, InvokeError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default())
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "actor-invoke", "actor-invoke").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), InvokeError> {
        self.cluster_address()?;

        if self.driver_name.trim().is_empty() {
            return Err(InvokeError::Configuration("driver_name must not be empty".to_string()));
        }
        if self.max_actors == 0 {
            return Err(InvokeError::Configuration("max_actors must be at least 1".to_string()));
        }
        if self.get_timeout_ms == Some(0) {
            return Err(InvokeError::Configuration("get_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    pub fn cluster_address(&self) -> Result<ClusterAddress, InvokeError> {
        ClusterAddress::parse(&self.address)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.password.clone())
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.get_timeout_ms.map(Duration::from_millis)
    }
}
