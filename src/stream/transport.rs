use async_trait::async_trait;

use crate::error::Result;
use crate::types::Event;

/// A live, bidirectional event connection.
///
/// `close` may be called from another task while `recv` is pending; the
/// pending `recv` must then fail rather than block forever.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn recv(&self) -> Result<Event>;
    async fn send(&self, event: &Event) -> Result<()>;
    async fn close(&self) -> Result<()>;
}
