//! Wire types exchanged over the streaming connection.

use serde::{Deserialize, Serialize};

/// Event type carried by chat messages.
pub const MESSAGE_KIND: &str = "message";

/// A single event received from or sent to the streaming connection.
///
/// Inbound events come in many shapes (`{"type":"hello"}`, presence changes,
/// acknowledgements), so every field falls back to its default when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub text: String,
}

impl Event {
    /// Builds a chat message event.
    pub fn message(id: u64, channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            kind: MESSAGE_KIND.to_string(),
            channel: channel.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn is_message(&self) -> bool {
        self.kind == MESSAGE_KIND
    }
}
