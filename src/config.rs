use std::env;
use std::time::Duration;

use log::{debug, info};
use reqwest::header::HeaderValue;
use url::Url;

use crate::error::{BotError, Result};
use crate::session::RTM_START_URL;
use crate::stream::DEFAULT_ORIGIN;

pub const DEFAULT_TRIGGER_WORD: &str = "insult";
const DEFAULT_STOP_AFTER_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub trigger_word: String,
    pub session_url: String,
    pub origin: String,
    /// Delay before the scripted stop in [`crate::run`]; `None` disables it.
    pub stop_after: Option<Duration>,
    pub restart: bool,
}

impl Config {
    /// Builds the configuration from the token argument and optional
    /// `BOT_*` environment overrides (a `.env` file is honored).
    ///
    /// # Errors
    ///
    /// Returns `Config` if the token is empty or an override is invalid.
    pub fn from_env(token: String) -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();
        Self::from_lookup(token, |key| env::var(key).ok())
    }

    /// Builds the configuration, resolving overrides through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the token is empty or an override is invalid.
    pub fn from_lookup<F>(token: String, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(BotError::Config("token cannot be empty".to_string()));
        }

        let trigger_word = lookup("BOT_TRIGGER_WORD")
            .unwrap_or_else(|| DEFAULT_TRIGGER_WORD.to_string());
        validate_trigger_word(&trigger_word)?;

        let session_url = lookup("BOT_SESSION_URL").unwrap_or_else(|| RTM_START_URL.to_string());
        Url::parse(&session_url).map_err(|e| {
            BotError::Config(format!("invalid BOT_SESSION_URL '{session_url}': {e}"))
        })?;

        let origin = lookup("BOT_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        HeaderValue::from_str(&origin)
            .map_err(|e| BotError::Config(format!("invalid BOT_ORIGIN '{origin}': {e}")))?;

        let stop_after = match lookup("BOT_STOP_AFTER_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                BotError::Config(format!("invalid BOT_STOP_AFTER_SECS '{raw}': {e}"))
            })?,
            None => DEFAULT_STOP_AFTER_SECS,
        };
        let stop_after = (stop_after > 0).then(|| Duration::from_secs(stop_after));

        let restart = match lookup("BOT_RESTART") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| BotError::Config(format!("invalid BOT_RESTART '{raw}'")))?,
            None => true,
        };

        info!("Configuration loaded successfully");
        debug!("Token length: {} characters", token.len());
        debug!("Trigger word: {trigger_word}");
        debug!("Session URL: {session_url}");
        debug!("Scripted stop: {stop_after:?}, restart: {restart}");

        Ok(Self {
            token,
            trigger_word,
            session_url,
            origin,
            stop_after,
            restart,
        })
    }
}

/// Trigger words are matched as a single space-delimited token.
///
/// # Errors
///
/// Returns `Config` if the word is empty or contains a space.
pub fn validate_trigger_word(word: &str) -> Result<()> {
    if word.is_empty() {
        return Err(BotError::Config("trigger word cannot be empty".to_string()));
    }
    if word.contains(' ') {
        return Err(BotError::Config(format!(
            "trigger word '{word}' cannot contain spaces"
        )));
    }
    Ok(())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(token: &str, vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(token.to_string(), |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = load("xoxb-123", &[]).expect("valid config");
        assert_eq!(config.token, "xoxb-123");
        assert_eq!(config.trigger_word, DEFAULT_TRIGGER_WORD);
        assert_eq!(config.session_url, RTM_START_URL);
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert_eq!(config.stop_after, Some(Duration::from_secs(5)));
        assert!(config.restart);
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(matches!(load("   ", &[]), Err(BotError::Config(_))));
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(
            "xoxb-123",
            &[
                ("BOT_TRIGGER_WORD", "roast"),
                ("BOT_SESSION_URL", "http://127.0.0.1:9000/rtm.start"),
                ("BOT_ORIGIN", "https://bots.example.com"),
                ("BOT_STOP_AFTER_SECS", "0"),
                ("BOT_RESTART", "no"),
            ],
        )
        .expect("valid config");
        assert_eq!(config.trigger_word, "roast");
        assert_eq!(config.session_url, "http://127.0.0.1:9000/rtm.start");
        assert_eq!(config.origin, "https://bots.example.com");
        assert_eq!(config.stop_after, None);
        assert!(!config.restart);
    }

    #[test]
    fn multi_word_trigger_is_rejected() {
        let err = load("xoxb-123", &[("BOT_TRIGGER_WORD", "insult me")]).expect_err("spaces");
        assert!(matches!(err, BotError::Config(_)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(load("t", &[("BOT_SESSION_URL", "not a url")]).is_err());
        assert!(load("t", &[("BOT_STOP_AFTER_SECS", "soon")]).is_err());
        assert!(load("t", &[("BOT_RESTART", "maybe")]).is_err());
    }

    #[test]
    fn origin_must_be_a_valid_header_value() {
        let err = load("t", &[("BOT_ORIGIN", "https://a\nb")]).expect_err("control char");
        assert!(matches!(err, BotError::Config(_)));
    }
}
