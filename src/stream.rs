//! Streaming connection: the transport seam and its websocket implementation.

mod transport;
mod websocket;

pub use transport::EventTransport;
pub use websocket::{DEFAULT_ORIGIN, WebSocketTransport};
