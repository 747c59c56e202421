// Configuration structs

use super::constants::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration, stored as `~/.hotkeyndq/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Control server to send commands to
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Command send settings
    #[serde(default)]
    pub command: CommandConfig,

    /// Custom page catalog (falls back to ~/.hotkeyndq/catalog.toml, then the built-in one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

/// Saved control server address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_ip")]
    pub ip: String,
    #[serde(default = "default_port")]
    pub port: u32,
}

/// Discovery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// How long to wait for a reply
    #[serde(default = "default_discovery_timeout_ms")]
    pub timeout_ms: u64,
    /// UDP port requests are broadcast to
    #[serde(default = "default_discovery_port")]
    pub port: u16,
}

/// Command sender configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_ip() -> String {
    DEFAULT_SERVER_IP.to_string()
}

fn default_port() -> u32 {
    u32::from(DEFAULT_COMMAND_PORT)
}

fn default_discovery_timeout_ms() -> u64 {
    DEFAULT_DISCOVERY_TIMEOUT_MS
}

fn default_discovery_port() -> u16 {
    DISCOVERY_PORT
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ip: default_ip(),
            port: default_port(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_DISCOVERY_TIMEOUT_MS,
            port: DISCOVERY_PORT,
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl DiscoveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl CommandConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Config {
    /// Validate configuration and return helpful errors
    ///
    /// The saved port is deliberately not checked here: an out-of-range port
    /// is reported as "Invalid port" when a command is pressed, the same
    /// way a bad value typed into the connection form is.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.connection.ip.trim().is_empty() {
            anyhow::bail!("connection.ip must not be empty");
        }
        if self.discovery.timeout_ms == 0 {
            anyhow::bail!("discovery.timeout_ms must be greater than zero");
        }
        if self.discovery.port == 0 {
            anyhow::bail!("discovery.port must be in 1..=65535");
        }
        if self.command.connect_timeout_ms == 0 {
            anyhow::bail!("command.connect_timeout_ms must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_app() {
        let config = Config::default();
        assert_eq!(config.connection.ip, "192.168.0.100");
        assert_eq!(config.connection.port, 5555);
        assert_eq!(config.discovery.timeout(), Duration::from_secs(3));
        assert_eq!(config.command.connect_timeout(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[connection]\nip = \"10.0.0.5\"\n").unwrap();
        assert_eq!(config.connection.ip, "10.0.0.5");
        assert_eq!(config.connection.port, 5555);
        assert_eq!(config.discovery.port, 5556);
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = Config::default();
        config.discovery.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.command.connect_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_ip_rejected() {
        let mut config = Config::default();
        config.connection.ip = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
