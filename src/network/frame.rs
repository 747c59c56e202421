// Command frame wire format
//
// One UTF-8 JSON object per line:
//   {"type":"command","id":"GEAR_TOGGLE"}\n

use serde::{Deserialize, Serialize};

/// Value of the `type` field for command frames
pub const FRAME_TYPE_COMMAND: &str = "command";

/// A single newline-terminated control message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFrame {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub id: String,
}

impl CommandFrame {
    pub fn command(id: impl Into<String>) -> Self {
        Self {
            kind: FRAME_TYPE_COMMAND.to_string(),
            id: id.into(),
        }
    }

    /// A command frame carrying a non-empty id
    pub fn is_command(&self) -> bool {
        self.kind == FRAME_TYPE_COMMAND && !self.id.is_empty()
    }

    /// Serialize as one line, trailing newline included
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Parse one line (without its newline)
    pub fn decode(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim_end_matches('\r'))
    }
}
