// Service discovery client
//
// Finds a control server on the local network with a single UDP broadcast:
// send the request, wait for one reply, give up at the deadline.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;

use crate::config::constants::*;
use crate::config::DiscoveryConfig;
use crate::errors::{DiscoveryError, SendError};
use crate::network::ConnectionTarget;

/// A control server that answered a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub ip: String,
    pub port: u16,
    pub name: String,
}

impl ServerInfo {
    /// Parse a discovery reply datagram
    pub fn parse(payload: &[u8]) -> Result<Self, DiscoveryError> {
        let text = std::str::from_utf8(payload)
            .map_err(|e| DiscoveryError::MalformedResponse(format!("not UTF-8: {}", e)))?;
        let info: ServerInfo = serde_json::from_str(text)
            .map_err(|e| DiscoveryError::MalformedResponse(e.to_string()))?;
        if info.port == 0 {
            return Err(DiscoveryError::MalformedResponse(
                "port must be in 1..=65535".to_string(),
            ));
        }
        Ok(info)
    }

    /// Where to send commands for this server
    pub fn target(&self) -> Result<ConnectionTarget, SendError> {
        ConnectionTarget::new(self.ip.as_str(), i64::from(self.port))
    }
}

/// Client for discovering control servers
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    target: SocketAddr,
}

impl Default for DiscoveryClient {
    fn default() -> Self {
        Self::with_port(DISCOVERY_PORT)
    }
}

impl DiscoveryClient {
    /// Broadcast requests to 255.255.255.255 on `port`
    pub fn with_port(port: u16) -> Self {
        Self {
            target: SocketAddr::from((BROADCAST_ADDR, port)),
        }
    }

    /// Send requests to a specific address instead of broadcasting
    pub fn with_target(target: SocketAddr) -> Self {
        Self { target }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::with_port(config.port)
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Query once and report why nothing was found.
    ///
    /// `timeout` covers the whole exchange from bind to reply. The socket
    /// lives inside the timed future, so it is closed on every path.
    pub async fn try_discover(&self, timeout: Duration) -> Result<ServerInfo, DiscoveryError> {
        tokio::time::timeout(timeout, self.query())
            .await
            .map_err(|_| DiscoveryError::Timeout(timeout))?
    }

    /// Query once; any failure is logged and reported as not found
    pub async fn discover(&self, timeout: Duration) -> Option<ServerInfo> {
        tracing::info!("Discovering control servers on local network...");
        match self.try_discover(timeout).await {
            Ok(info) => {
                tracing::info!(
                    "Found control server '{}' at {}:{}",
                    info.name,
                    info.ip,
                    info.port
                );
                Some(info)
            }
            Err(DiscoveryError::Timeout(t)) => {
                tracing::info!("No control server answered within {}ms", t.as_millis());
                None
            }
            Err(e) => {
                tracing::warn!("Discovery failed: {}", e);
                None
            }
        }
    }

    async fn query(&self) -> Result<ServerInfo, DiscoveryError> {
        let bind_addr = if self.target.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(bind_addr).await?;
        socket.set_broadcast(true)?;

        socket
            .send_to(DISCOVERY_MESSAGE.as_bytes(), self.target)
            .await?;
        tracing::debug!(to = %self.target, "Sent discovery request");

        let mut buf = [0u8; DISCOVERY_BUFFER_SIZE];
        let (len, from) = socket.recv_from(&mut buf).await?;
        tracing::debug!(
            from = %from,
            "Received discovery reply: {}",
            String::from_utf8_lossy(&buf[..len])
        );

        ServerInfo::parse(&buf[..len])
    }
}

/// Broadcast a request on the default port and wait up to `timeout` for a reply
pub async fn discover(timeout: Duration) -> Option<ServerInfo> {
    DiscoveryClient::default().discover(timeout).await
}
