//! Bot core: session lifecycle and the listen/respond loop.

use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, error, info, warn};

use crate::config::{Config, DEFAULT_TRIGGER_WORD, validate_trigger_word};
use crate::error::{BotError, Result};
use crate::phrases::RandomPicker;
use crate::retry::RetryPolicy;
use crate::session::{RTM_START_URL, SessionClient, SessionInfo};
use crate::stream::{DEFAULT_ORIGIN, EventTransport, WebSocketTransport};
use crate::trigger::TriggerRule;

/// Identity and connection handed out by one successful `start`.
struct Session {
    self_id: String,
    streaming_url: String,
    transport: Arc<dyn EventTransport>,
}

/// A single bot instance. Share it through `Arc` to call [`Bot::stop`] from
/// another task while [`Bot::listen_and_respond`] is running.
pub struct Bot {
    token: String,
    trigger_word: String,
    origin: String,
    sessions: SessionClient,
    picker: Arc<RandomPicker>,
    retry: RetryPolicy,
    /// `Some` exactly while running.
    session: Mutex<Option<Arc<Session>>>,
}

impl Bot {
    /// Creates a disconnected bot for `token`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the token is empty, or `Network` if the HTTP client
    /// cannot be built.
    pub fn new(token: impl Into<String>, picker: Arc<RandomPicker>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(BotError::Config("token cannot be empty".to_string()));
        }
        Ok(Self {
            token,
            trigger_word: DEFAULT_TRIGGER_WORD.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            sessions: SessionClient::new(RTM_START_URL)?,
            picker,
            retry: RetryPolicy::default(),
            session: Mutex::new(None),
        })
    }

    /// Creates a bot using every knob from `config`.
    ///
    /// # Errors
    ///
    /// Same as [`Bot::new`], plus `Config` for an invalid trigger word.
    pub fn from_config(config: &Config, picker: Arc<RandomPicker>) -> Result<Self> {
        let bot = Self::new(config.token.clone(), picker)?
            .with_trigger_word(config.trigger_word.clone())?
            .with_session_endpoint(config.session_url.clone())?;
        Ok(bot.with_origin(config.origin.clone()))
    }

    /// # Errors
    ///
    /// Returns `Config` if the word is empty or contains a space.
    pub fn with_trigger_word(mut self, word: impl Into<String>) -> Result<Self> {
        let word = word.into();
        validate_trigger_word(&word)?;
        self.trigger_word = word;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `Network` if the HTTP client cannot be built.
    pub fn with_session_endpoint(mut self, endpoint: impl Into<String>) -> Result<Self> {
        self.sessions = SessionClient::new(endpoint)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Self id assigned by the last successful `start`, while connected.
    #[must_use]
    pub fn self_id(&self) -> Option<String> {
        self.current_session().map(|session| session.self_id.clone())
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock_session().is_some()
    }

    /// Performs the session handshake and opens the streaming connection.
    ///
    /// # Errors
    ///
    /// Propagates `SessionClient` errors, and returns `Connection` if the
    /// streaming handshake fails.
    pub async fn start(&self) -> Result<()> {
        info!("Starting bot");
        let info = self.sessions.start_session(&self.token).await?;
        let transport = WebSocketTransport::connect(&info.url, &self.origin).await?;
        self.attach(info, Arc::new(transport)).await;
        Ok(())
    }

    /// Closes the streaming connection and lets the loop wind down.
    pub async fn stop(&self) {
        let taken = self.lock_session().take();
        let Some(session) = taken else {
            warn!("Stop requested while not connected");
            return;
        };

        info!("Stopping bot {}", session.self_id);
        if let Err(e) = session.transport.close().await {
            error!("Failed to close streaming connection: {e}");
        }
    }

    /// Receives events and replies to triggers until stopped.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` if the bot was never started (or has been
    /// stopped), and the last receive error once a bounded retry policy is
    /// exhausted.
    pub async fn listen_and_respond(&self) -> Result<()> {
        let session = self.current_session().ok_or(BotError::NotConnected)?;
        let rule = TriggerRule::new(&session.self_id, self.trigger_word.clone());
        info!(
            "Listening on {} for '{} {}'",
            session.streaming_url,
            rule.mention(),
            self.trigger_word
        );

        let mut failures = 0;
        while self.is_live(&session) {
            let event = match session.transport.recv().await {
                Ok(event) => {
                    failures = 0;
                    event
                }
                Err(e) => {
                    if !self.is_live(&session) {
                        debug!("Receive ended after stop: {e}");
                        break;
                    }
                    warn!("Failed to receive event: {e}");
                    failures += 1;
                    match self.retry.delay_for_failure(failures) {
                        Some(delay) if !delay.is_zero() => {
                            debug!("Backing off for {delay:?}");
                            tokio::time::sleep(delay).await;
                        }
                        Some(_) => {}
                        None => {
                            error!("Giving up after {failures} consecutive receive failures");
                            return Err(e);
                        }
                    }
                    continue;
                }
            };

            if !rule.matches(&event) {
                debug!("Ignoring {} event {}", event.kind, event.id);
                continue;
            }

            let reply = rule.reply(&event, self.picker.pick());
            match session.transport.send(&reply).await {
                Ok(()) => info!("Replied in channel {}: {}", reply.channel, reply.text),
                Err(e) => warn!("Failed to send reply in channel {}: {e}", reply.channel),
            }
        }

        info!("Stopped listening");
        Ok(())
    }

    async fn attach(&self, info: SessionInfo, transport: Arc<dyn EventTransport>) {
        let session = Arc::new(Session {
            self_id: info.self_id,
            streaming_url: info.url,
            transport,
        });
        let previous = self.lock_session().replace(session);

        if let Some(previous) = previous {
            warn!("Replacing live session {}", previous.self_id);
            if let Err(e) = previous.transport.close().await {
                error!("Failed to close previous streaming connection: {e}");
            }
        }
    }

    fn is_live(&self, session: &Arc<Session>) -> bool {
        self.lock_session()
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, session))
    }

    fn current_session(&self) -> Option<Arc<Session>> {
        self.lock_session().clone()
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<Arc<Session>>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
