// Service discovery
//
// One-shot UDP request/reply used to locate a control server on the LAN

pub mod discovery;
pub mod discovery_client;

pub use discovery::DiscoveryResponder;
pub use discovery_client::{discover, DiscoveryClient, ServerInfo};
