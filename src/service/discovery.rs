// Discovery responder
//
// Answers HOTKEYNDQ_DISCOVER requests on UDP 5556 so panels can find the
// control server without typing its address.

use anyhow::{Context, Result};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use super::discovery_client::ServerInfo;
use crate::config::constants::*;

/// Replies to discovery requests with this server's address
pub struct DiscoveryResponder {
    socket: UdpSocket,
    command_port: u16,
    name: String,
}

impl DiscoveryResponder {
    /// Bind the responder. An empty or missing `name` uses the hostname.
    pub async fn bind(addr: SocketAddr, command_port: u16, name: Option<String>) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .with_context(|| format!("Failed to bind discovery socket on {}", addr))?;

        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(default_server_name);

        tracing::debug!("Created discovery responder with name: {}", name);

        Ok(Self {
            socket,
            command_port,
            name,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Serve requests until `shutdown` fires
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        tracing::info!(
            "Answering discovery requests on {} as '{}' (command port {})",
            self.local_addr()?,
            self.name,
            self.command_port
        );

        let mut buf = [0u8; DISCOVERY_BUFFER_SIZE];
        loop {
            let (len, peer) = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok(r) => r,
                    Err(e) => {
                        // e.g. ICMP port unreachable surfacing as ConnectionReset
                        tracing::warn!("Discovery receive failed: {}", e);
                        continue;
                    }
                },
            };

            if &buf[..len] != DISCOVERY_MESSAGE.as_bytes() {
                tracing::debug!(peer = %peer, "Ignoring {} byte datagram", len);
                continue;
            }

            if let Err(e) = self.reply(peer).await {
                tracing::warn!(peer = %peer, "Failed to answer discovery request: {}", e);
            }
        }

        tracing::info!("Stopped answering discovery requests");
        Ok(())
    }

    async fn reply(&self, peer: SocketAddr) -> Result<()> {
        let ip = local_ip_toward(peer).await?;
        let info = ServerInfo {
            ip: ip.to_string(),
            port: self.command_port,
            name: self.name.clone(),
        };
        let payload = serde_json::to_vec(&info)?;
        self.socket.send_to(&payload, peer).await?;
        tracing::info!(peer = %peer, "Answered discovery request with {}:{}", info.ip, info.port);
        Ok(())
    }
}

/// The local address the OS would use to reach `peer`.
/// Connecting a UDP socket sends nothing; it only picks a route.
async fn local_ip_toward(peer: SocketAddr) -> io::Result<IpAddr> {
    let unspecified: IpAddr = if peer.is_ipv4() {
        Ipv4Addr::UNSPECIFIED.into()
    } else {
        Ipv6Addr::UNSPECIFIED.into()
    };
    let socket = UdpSocket::bind((unspecified, 0)).await?;
    socket.connect(peer).await?;
    Ok(socket.local_addr()?.ip())
}

fn default_server_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "hotkeyndq".to_string())
}
