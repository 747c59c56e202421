// Command sender.
//
// One TCP connection per command, nothing kept between presses:
//
//   connect (bounded)  ->  write {"type":"command","id":"..."}\n  ->  flush  ->  close
//
// The server never answers. A send counts as successful once the bytes are
// handed to the socket; whether the simulator acted on them is unknown here.

use std::io;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use super::frame::CommandFrame;
use super::target::ConnectionTarget;
use crate::config::constants::DEFAULT_CONNECT_TIMEOUT_MS;
use crate::config::CommandConfig;
use crate::errors::SendError;

/// A command that reached the server's socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub command_id: String,
}

impl Sent {
    pub fn message(&self) -> String {
        format!("Sent: {}", self.command_id)
    }
}

/// What the panel shows after a press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub success: bool,
    pub message: String,
}

impl From<Result<Sent, SendError>> for SendOutcome {
    fn from(result: Result<Sent, SendError>) -> Self {
        match result {
            Ok(sent) => SendOutcome {
                success: true,
                message: sent.message(),
            },
            Err(e) => SendOutcome {
                success: false,
                message: e.status_message(),
            },
        }
    }
}

/// Sends command frames over short-lived TCP connections
#[derive(Debug, Clone)]
pub struct CommandSender {
    connect_timeout: Duration,
}

impl Default for CommandSender {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS))
    }
}

impl CommandSender {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn from_config(config: &CommandConfig) -> Self {
        Self::new(config.connect_timeout())
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Send one command and report the typed result
    pub async fn try_send(
        &self,
        target: &ConnectionTarget,
        command_id: &str,
    ) -> Result<Sent, SendError> {
        let frame = CommandFrame::command(command_id)
            .encode()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let connect = TcpStream::connect((target.ip(), target.port()));
        let mut stream = match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(SendError::Timeout {
                    target: target.to_string(),
                    timeout: self.connect_timeout,
                })
            }
        };

        stream.write_all(&frame).await?;
        stream.flush().await?;

        // The frame is already on the wire; a failed FIN does not undo that.
        if let Err(e) = stream.shutdown().await {
            tracing::debug!(server = %target, "Shutdown after send failed: {}", e);
        }

        Ok(Sent {
            command_id: command_id.to_string(),
        })
    }

    /// Send one command; every failure becomes an unsuccessful outcome
    pub async fn send(&self, target: &ConnectionTarget, command_id: &str) -> SendOutcome {
        let result = self.try_send(target, command_id).await;
        match &result {
            Ok(_) => tracing::debug!(server = %target, command = command_id, "Command sent"),
            Err(e) => tracing::warn!(server = %target, command = command_id, "Command failed: {}", e),
        }
        result.into()
    }

    /// Run the send on its own task so the caller is never blocked.
    /// Concurrent dispatches use independent connections and may
    /// reach the server in any order.
    pub fn dispatch(
        &self,
        target: ConnectionTarget,
        command_id: impl Into<String>,
    ) -> JoinHandle<SendOutcome> {
        let sender = self.clone();
        let command_id = command_id.into();
        tokio::spawn(async move { sender.send(&target, &command_id).await })
    }
}

/// Validate `(ip, port)` and send `command_id` with the default connect bound.
/// An out-of-range port fails without touching the network.
pub async fn send_command(ip: &str, port: i64, command_id: &str) -> SendOutcome {
    match ConnectionTarget::new(ip, port) {
        Ok(target) => CommandSender::default().send(&target, command_id).await,
        Err(e) => Err::<Sent, _>(e).into(),
    }
}
