//! Websocket-backed event transport.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{debug, info};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::EventTransport;
use crate::error::{BotError, Result};
use crate::types::Event;

/// Origin presented during the websocket handshake.
pub const DEFAULT_ORIGIN: &str = "https://api.slack.com/";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct WebSocketTransport {
    sink: Mutex<SplitSink<Socket, Message>>,
    stream: Mutex<SplitStream<Socket>>,
    closed: watch::Sender<bool>,
}

impl WebSocketTransport {
    /// Opens a websocket to `url`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `origin` is not a valid header value, and
    /// `Connection` if the handshake fails.
    pub async fn connect(url: &str, origin: &str) -> Result<Self> {
        let mut request = url
            .into_client_request()
            .map_err(|e| BotError::Connection(format!("invalid streaming url '{url}': {e}")))?;
        let origin = HeaderValue::from_str(origin)
            .map_err(|e| BotError::Config(format!("invalid origin '{origin}': {e}")))?;
        request.headers_mut().insert(ORIGIN, origin);

        debug!("Opening streaming connection to {url}");
        let (socket, _response) = connect_async(request)
            .await
            .map_err(|e| BotError::Connection(format!("websocket handshake failed: {e}")))?;
        info!("Streaming connection established");

        let (sink, stream) = socket.split();
        let (closed, _) = watch::channel(false);
        Ok(Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
            closed,
        })
    }
}

#[async_trait]
impl EventTransport for WebSocketTransport {
    async fn recv(&self) -> Result<Event> {
        let closed = self.closed.subscribe();
        let mut stream = self.stream.lock().await;
        loop {
            let frame = tokio::select! {
                () = wait_closed(closed.clone()) => {
                    return Err(BotError::Connection("connection closed".to_string()));
                }
                frame = stream.next() => frame,
            };

            match frame {
                Some(Ok(Message::Text(text))) => return parse_event(text.as_str()),
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Ok(Message::Binary(_))) => {
                    return Err(BotError::Protocol("received binary frame".to_string()));
                }
                Some(Ok(Message::Close(frame))) => {
                    return Err(BotError::Connection(format!(
                        "connection closed by peer: {frame:?}"
                    )));
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Err(BotError::Connection("stream ended".to_string())),
            }
        }
    }

    async fn send(&self, event: &Event) -> Result<()> {
        let text = serde_json::to_string(event)
            .map_err(|e| BotError::Protocol(format!("failed to encode event: {e}")))?;
        self.sink.lock().await.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.send_replace(true);
        self.sink.lock().await.close().await?;
        debug!("Streaming connection closed");
        Ok(())
    }
}

async fn wait_closed(mut closed: watch::Receiver<bool>) {
    loop {
        let is_closed = *closed.borrow_and_update();
        if is_closed || closed.changed().await.is_err() {
            return;
        }
    }
}

fn parse_event(text: &str) -> Result<Event> {
    serde_json::from_str(text).map_err(|e| BotError::Protocol(format!("malformed event: {e}")))
}
