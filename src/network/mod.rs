// Network module: command dispatch to the control server.
//
// Each button press opens its own TCP connection, writes a single JSON
// frame and closes. There is no session, pool or acknowledgement.

pub mod client;
pub mod frame;
pub mod target;

pub use client::{send_command, CommandSender, SendOutcome, Sent};
pub use frame::{CommandFrame, FRAME_TYPE_COMMAND};
pub use target::ConnectionTarget;
