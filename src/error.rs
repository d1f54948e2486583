use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    #[error("Not connected to the messaging service")]
    NotConnected,
}

impl From<tungstenite::Error> for BotError {
    fn from(err: tungstenite::Error) -> Self {
        BotError::WebSocket(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
