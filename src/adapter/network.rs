//! Local address discovery

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::{Level, event};

use crate::{
    domain::{constant::bootstrap, error::InvokeError},
    port::network::NodeAddressResolver
};

/// Finds the address of the interface holding the default route by connecting
/// an unbound UDP socket to a probe address. No packet is sent. Falls back to
/// loopback when the host has no route.
#[derive(Debug, Clone)]
pub struct UdpProbeResolver {
    probe: SocketAddr
}

impl UdpProbeResolver {
    pub fn new(probe: SocketAddr) -> Self {
        Self { probe }
    }
}

impl Default for UdpProbeResolver {
    fn default() -> Self {
        Self::new(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80))
    }
}

#[async_trait]
impl NodeAddressResolver for UdpProbeResolver {
    async fn local_ip(&self) -> Result<IpAddr, InvokeError> {
        let socket = UdpSocket::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)).await?;

        match socket.connect(self.probe).await {
            Ok(()) => {
                let ip = socket.local_addr()?.ip();
                if !ip.is_unspecified() {
                    return Ok(ip);
                }
            }
            Err(e) => {
                event!(Level::WARN, event = bootstrap::NODE_RESOLVED, error = %e, message = "no_route_using_loopback");
            }
        }

        Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

/// Resolver returning a configured address
#[derive(Debug, Clone, Copy)]
pub struct FixedResolver(pub IpAddr);

#[async_trait]
impl NodeAddressResolver for FixedResolver {
    async fn local_ip(&self) -> Result<IpAddr, InvokeError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_resolves_a_concrete_address() {
        let ip = UdpProbeResolver::default().local_ip().await.unwrap();
        assert!(!ip.is_unspecified());
    }

    #[tokio::test]
    async fn test_fixed_resolver() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 121, 61));
        assert_eq!(FixedResolver(ip).local_ip().await.unwrap(), ip);
    }
}
