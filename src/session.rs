//! Session handshake against the real-time messaging start endpoint.

use std::time::Duration;

use log::{debug, info};
use reqwest::StatusCode;
use reqwest::header::CONNECTION;
use serde::Deserialize;

use crate::error::{BotError, Result};

pub const RTM_START_URL: &str = "https://slack.com/api/rtm.start";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// What the handshake hands back: where to stream and who we are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub url: String,
    pub self_id: String,
}

#[derive(Debug, Deserialize)]
struct RtmStartResponse {
    ok: bool,
    #[serde(default)]
    error: String,
    #[serde(default)]
    url: String,
    #[serde(rename = "self", default)]
    identity: SelfResponse,
}

#[derive(Debug, Default, Deserialize)]
struct SelfResponse {
    #[serde(default)]
    id: String,
}

/// One-shot client for the session-start endpoint. No retries.
#[derive(Debug, Clone)]
pub struct SessionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl SessionClient {
    /// Creates a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Performs the handshake and returns the streaming URL and self id.
    ///
    /// # Errors
    ///
    /// - `Config` if `token` is empty
    /// - `Network` on transport failure (DNS, connect, timeout)
    /// - `Protocol` on a non-200 status, an undecodable body, or `ok: false`
    pub async fn start_session(&self, token: &str) -> Result<SessionInfo> {
        if token.is_empty() {
            return Err(BotError::Config("token cannot be empty".to_string()));
        }

        debug!("Requesting session from {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("token", token)])
            .header(CONNECTION, "close")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BotError::Protocol(format!(
                "api request failed with code {}",
                status.as_u16()
            )));
        }

        let body = response.text().await?;
        let info = parse_session_response(&body)?;
        info!("Session started for {}", info.self_id);
        Ok(info)
    }
}

/// Decodes a session-start response body.
///
/// # Errors
///
/// Returns `Protocol` if the body is not the expected JSON, reports
/// `ok: false` (the detail is the service's `error` field), or lacks the
/// streaming URL or self id.
pub fn parse_session_response(body: &str) -> Result<SessionInfo> {
    let data: RtmStartResponse = serde_json::from_str(body)
        .map_err(|e| BotError::Protocol(format!("malformed session response: {e}")))?;

    if !data.ok {
        return Err(BotError::Protocol(data.error));
    }
    if data.url.is_empty() {
        return Err(BotError::Protocol(
            "session response is missing the streaming url".to_string(),
        ));
    }
    if data.identity.id.is_empty() {
        return Err(BotError::Protocol(
            "session response is missing the self id".to_string(),
        ));
    }

    Ok(SessionInfo {
        url: data.url,
        self_id: data.identity.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_successful_response() -> std::result::Result<(), &'static str> {
        let info = parse_session_response(r#"{"ok":true,"url":"wss://x","self":{"id":"U123"}}"#)
            .map_err(|_| "expected a valid response")?;
        assert_eq!(
            info,
            SessionInfo {
                url: "wss://x".to_string(),
                self_id: "U123".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn surfaces_service_error_as_detail() {
        let err = parse_session_response(r#"{"ok":false,"error":"invalid_auth"}"#)
            .expect_err("rejected session");
        match err {
            BotError::Protocol(detail) => assert_eq!(detail, "invalid_auth"),
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_body() {
        assert!(matches!(
            parse_session_response("<html>oops</html>"),
            Err(BotError::Protocol(_))
        ));
        assert!(matches!(
            parse_session_response(r#"{"url":"wss://x"}"#),
            Err(BotError::Protocol(_))
        ));
    }

    #[test]
    fn rejects_ok_response_without_identity() {
        assert!(matches!(
            parse_session_response(r#"{"ok":true,"url":"wss://x"}"#),
            Err(BotError::Protocol(_))
        ));
        assert!(matches!(
            parse_session_response(r#"{"ok":true,"self":{"id":"U1"}}"#),
            Err(BotError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn empty_token_fails_before_request() {
        let client = SessionClient::new("http://127.0.0.1:9/rtm.start").expect("client");
        assert!(matches!(
            client.start_session("").await,
            Err(BotError::Config(_))
        ));
    }
}
