// Error types for the network layer
//
// Every failure is recovered at the operation boundary: discovery collapses
// to "not found" and command sends to a (success, message) pair. These types
// carry the detail that gets logged or shown as status text.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Why a discovery attempt found nothing
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No reply arrived within the bound
    #[error("no discovery reply within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// A reply arrived but was not a valid server description
    #[error("malformed discovery reply: {0}")]
    MalformedResponse(String),

    /// Socket-level failure (bind, broadcast, unreachable network)
    #[error("discovery socket error: {0}")]
    Network(#[from] io::Error),
}

/// Why a command was not sent
#[derive(Debug, Error)]
pub enum SendError {
    /// Rejected before any network attempt
    #[error("{0}")]
    InvalidInput(String),

    /// Connect did not complete within the bound
    #[error("connect to {target} timed out after {}ms", .timeout.as_millis())]
    Timeout { target: String, timeout: Duration },

    /// Resolution, refusal, reset or write failure
    #[error("{0}")]
    Network(#[from] io::Error),
}

impl SendError {
    pub fn invalid_port() -> Self {
        SendError::InvalidInput("Invalid port".to_string())
    }

    /// True for failures detected without touching the network
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SendError::InvalidInput(_))
    }

    /// Status text for the panel
    pub fn status_message(&self) -> String {
        match self {
            SendError::InvalidInput(msg) => msg.clone(),
            other => format!("Error: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_status_is_bare() {
        assert_eq!(SendError::invalid_port().status_message(), "Invalid port");
        assert!(SendError::invalid_port().is_invalid_input());
    }

    #[test]
    fn test_network_status_is_prefixed() {
        let err = SendError::from(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "Connection refused",
        ));
        assert_eq!(err.status_message(), "Error: Connection refused");
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_timeout_message_names_target() {
        let err = SendError::Timeout {
            target: "10.0.0.5:5555".to_string(),
            timeout: Duration::from_millis(1000),
        };
        assert_eq!(
            err.status_message(),
            "Error: connect to 10.0.0.5:5555 timed out after 1000ms"
        );
    }

    #[test]
    fn test_discovery_timeout_message() {
        let err = DiscoveryError::Timeout(Duration::from_millis(500));
        assert_eq!(err.to_string(), "no discovery reply within 500ms");
    }
}
