//! Immutable catalog of reply phrases.

use std::sync::Arc;

use crate::error::{BotError, Result};

const SHAKESPEAREAN_INSULTS: &[&str] = &[
    "Thou art a boil, a plague sore, an embossed carbuncle.",
    "Away, you starvelling, you elf-skin, you dried neat's-tongue!",
    "Thine face is not worth sunburning.",
    "More of your conversation would infect my brain.",
    "Thou art as fat as butter.",
    "I do desire we may be better strangers.",
    "Thou lump of foul deformity!",
    "Your brain is as dry as the remainder biscuit after voyage.",
    "Thou cream-faced loon!",
    "Out of my sight! Thou dost infect mine eyes.",
    "Thou art unfit for any place but hell.",
    "There's no more faith in thee than in a stewed prune.",
    "Thou hast no more brain than I have in mine elbows.",
    "Thy sin's not accidental, but a trade.",
    "Thou art a flesh-monger, a fool and a coward.",
    "Methink'st thou art a general offence and every man should beat thee.",
    "Thou whoreson zed, thou unnecessary letter!",
    "You are not worth another word, else I'd call you knave.",
    "Thou clay-brained guts, thou knotty-pated fool!",
    "Would thou wert clean enough to spit upon.",
];

/// Ordered, non-empty list of reply strings shared read-only for the life of
/// the process.
#[derive(Debug, Clone)]
pub struct PhraseCatalog {
    phrases: Arc<[String]>,
}

impl PhraseCatalog {
    /// Creates a catalog from the given phrases.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `phrases` is empty.
    pub fn new<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Arc<[String]> = phrases.into_iter().map(Into::into).collect();
        if phrases.is_empty() {
            return Err(BotError::Config(
                "phrase catalog cannot be empty".to_string(),
            ));
        }
        Ok(Self { phrases })
    }

    /// Returns the built-in catalog of Shakespearean insults.
    #[must_use]
    pub fn shakespearean() -> Self {
        Self {
            phrases: SHAKESPEAREAN_INSULTS
                .iter()
                .map(|phrase| (*phrase).to_string())
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Always false: construction rejects empty catalogs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.phrases
    }

    #[must_use]
    pub fn contains(&self, phrase: &str) -> bool {
        self.phrases.iter().any(|candidate| candidate == phrase)
    }
}
