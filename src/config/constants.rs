// Project-wide constants
//
// Centralised here so port numbers and wire literals have one
// source of truth. Import via `use crate::config::constants::*;`.

use std::net::Ipv4Addr;

/// UDP port the control server listens on for discovery requests.
pub const DISCOVERY_PORT: u16 = 5556;

/// Literal request payload broadcast by the discovery client.
pub const DISCOVERY_MESSAGE: &str = "HOTKEYNDQ_DISCOVER";

/// Limited broadcast address (reaches every host on the local subnet).
pub const BROADCAST_ADDR: Ipv4Addr = Ipv4Addr::BROADCAST;

/// Default discovery wait in milliseconds.
pub const DEFAULT_DISCOVERY_TIMEOUT_MS: u64 = 3000;

/// Receive buffer for a discovery reply. Larger replies are truncated
/// and will fail to parse.
pub const DISCOVERY_BUFFER_SIZE: usize = 1024;

/// Default TCP port of the control server.
pub const DEFAULT_COMMAND_PORT: u16 = 5555;

/// Default server address used before anything has been saved.
pub const DEFAULT_SERVER_IP: &str = "192.168.0.100";

/// Bound on the TCP connect of a command send.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1000;

/// Bind address for the reference control server (all interfaces).
pub const DEFAULT_SERVER_BIND: &str = "0.0.0.0:5555";

/// Longest command line the control server buffers. A client that sends
/// a longer line is disconnected.
pub const MAX_FRAME_LENGTH: usize = 4096;

/// Command id that asks the reference control server to exit.
pub const QUIT_COMMAND_ID: &str = "QUIT_SERVER";

/// Buttons per row on a panel page.
pub const GRID_COLUMNS: usize = 3;
