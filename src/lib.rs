// HotKeyNDQ - button-grid remote control for flight-simulator servers
// Library exports

pub mod config;
pub mod errors;
pub mod network;
pub mod panel;
pub mod server;
pub mod service;

pub use errors::{DiscoveryError, SendError};
pub use network::{send_command, CommandSender, ConnectionTarget, SendOutcome};
pub use service::{discover, DiscoveryClient, ServerInfo};
