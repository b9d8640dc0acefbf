use std::net::IpAddr;

use async_trait::async_trait;

use crate::domain::error::InvokeError;

/// Port for discovering this process's network address
#[async_trait]
pub trait NodeAddressResolver: Send + Sync {
    async fn local_ip(&self) -> Result<IpAddr, InvokeError>;
}
