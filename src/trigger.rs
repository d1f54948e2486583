//! Exact-match trigger rule: `<@SELF_ID> <word>` and nothing else.

use crate::types::Event;

/// Mention form the service uses for a user id.
#[must_use]
pub fn mention_for(self_id: &str) -> String {
    format!("<@{self_id}>")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRule {
    mention: String,
    word: String,
}

impl TriggerRule {
    pub fn new(self_id: &str, word: impl Into<String>) -> Self {
        Self {
            mention: mention_for(self_id),
            word: word.into(),
        }
    }

    #[must_use]
    pub fn mention(&self) -> &str {
        &self.mention
    }

    /// True for a message whose text is exactly the mention and the trigger
    /// word separated by a single space.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        if !event.is_message() {
            return false;
        }
        let tokens: Vec<&str> = event.text.split(' ').collect();
        matches!(
            tokens.as_slice(),
            [mention, word] if *mention == self.mention && *word == self.word
        )
    }

    /// Builds the reply to `event`. The id echoes the inbound event's id.
    pub fn reply(&self, event: &Event, text: impl Into<String>) -> Event {
        Event::message(event.id, event.channel.clone(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> TriggerRule {
        TriggerRule::new("U123", "insult")
    }

    #[test]
    fn matches_mention_followed_by_word() {
        assert!(rule().matches(&Event::message(7, "C1", "<@U123> insult")));
    }

    #[test]
    fn rejects_other_shapes() {
        let rule = rule();
        for text in [
            "<@U123> insult please",
            "hello",
            "<@U999> insult",
            "<@U123> Insult",
            "<@U123>  insult",
            "<@U123> insult!",
            "insult <@U123>",
            "<@U123>",
            "",
        ] {
            assert!(!rule.matches(&Event::message(1, "C1", text)), "matched {text:?}");
        }
    }

    #[test]
    fn ignores_non_message_events() {
        let event = Event {
            id: 3,
            kind: "user_typing".to_string(),
            channel: "C1".to_string(),
            text: "<@U123> insult".to_string(),
        };
        assert!(!rule().matches(&event));
    }

    #[test]
    fn reply_echoes_id_and_channel() {
        let inbound = Event::message(7, "C1", "<@U123> insult");
        let reply = rule().reply(&inbound, "Thou cream-faced loon!");
        assert_eq!(reply, Event::message(7, "C1", "Thou cream-faced loon!"));
    }

    #[test]
    fn mention_wraps_id() {
        assert_eq!(rule().mention(), "<@U123>");
    }
}
