// Control Server Module
// Reference receiver for panel commands: accepts TCP connections, reads
// newline-delimited command frames and reports them to the caller.

mod connection;

pub use connection::ReceivedCommand;

use anyhow::{Context, Result};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::constants::{DEFAULT_SERVER_BIND, DISCOVERY_PORT};
use crate::service::DiscoveryResponder;

/// Configuration for the control server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address for commands (e.g., "0.0.0.0:5555")
    pub bind_address: String,
    /// Answer discovery requests
    pub advertise: bool,
    /// Bind address for discovery requests
    pub discovery_address: SocketAddr,
    /// Name returned to discovering panels (defaults to the hostname)
    pub service_name: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_SERVER_BIND.to_string(),
            advertise: true,
            discovery_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DISCOVERY_PORT)),
            service_name: None,
        }
    }
}

/// Accepts command connections until shut down
pub struct ControlServer {
    listener: TcpListener,
    events: Option<mpsc::UnboundedSender<ReceivedCommand>>,
}

impl ControlServer {
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind control server on {}", addr))?;
        Ok(Self::from_listener(listener))
    }

    pub fn from_listener(listener: TcpListener) -> Self {
        Self {
            listener,
            events: None,
        }
    }

    /// Report every received frame on `events`
    pub fn with_events(mut self, events: mpsc::UnboundedSender<ReceivedCommand>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` fires or a QUIT_SERVER command arrives
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        tracing::info!("Listening for commands on {}", self.local_addr()?);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::info!(peer = %peer, "New connection");
                        let events = self.events.clone();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            connection::handle(stream, peer, events, shutdown).await;
                        });
                    }
                    Err(e) => tracing::warn!("Accept failed: {}", e),
                },
            }
        }

        tracing::info!("Control server stopped");
        Ok(())
    }
}

/// Run the control server, plus the discovery responder when `advertise` is set.
/// Returns once `shutdown` fires or a client sends QUIT_SERVER.
pub async fn serve(
    config: ServerConfig,
    events: Option<mpsc::UnboundedSender<ReceivedCommand>>,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut server = ControlServer::bind(&config.bind_address).await?;
    if let Some(events) = events {
        server = server.with_events(events);
    }
    let command_port = server.local_addr()?.port();

    let responder = if config.advertise {
        let responder =
            DiscoveryResponder::bind(config.discovery_address, command_port, config.service_name)
                .await?;
        let token = shutdown.clone();
        Some(tokio::spawn(responder.run(token)))
    } else {
        None
    };

    let result = server.run(shutdown.clone()).await;

    // A QUIT_SERVER frame ends the accept loop; stop discovery with it
    shutdown.cancel();
    if let Some(handle) = responder {
        match handle.await {
            Ok(Err(e)) => tracing::warn!("Discovery responder failed: {}", e),
            Err(e) => tracing::warn!("Discovery responder task panicked: {}", e),
            Ok(Ok(())) => {}
        }
    }

    result
}
