//! Question extraction from inbound events.
//!
//! Direct chats: the whole message is the question. Group chats: the bot
//! only answers when the message starts by mentioning it (`@_user_1` bound to
//! the bot's id) or starts with the command prefix followed by whitespace.

use chatbridge_types::event::{ChatKind, InboundEvent};

/// Placeholder the platform substitutes for the first mention in a message.
pub const FIRST_MENTION_KEY: &str = "@_user_1";

/// What addresses the bot in a group chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRules {
    /// The bot's own account id; without it mentions never match.
    pub bot_id: Option<String>,
    pub command_prefix: String,
}

impl Default for TriggerRules {
    fn default() -> Self {
        Self {
            bot_id: None,
            command_prefix: "/chatgpt".to_string(),
        }
    }
}

/// The question an event asks the bot, or `None` if it should be ignored.
pub fn extract_question(event: &InboundEvent, rules: &TriggerRules) -> Option<String> {
    let text = event.text.trim();
    if text.is_empty() {
        return None;
    }

    let question = match event.chat_kind {
        ChatKind::Direct => text,
        ChatKind::Group => {
            if let Some(rest) = strip_word(text, FIRST_MENTION_KEY) {
                if !mentions_bot(event, rules) {
                    return None;
                }
                rest
            } else {
                let rest = strip_word(text, &rules.command_prefix)?;
                // The command needs an argument separated by whitespace.
                if !rest.starts_with(char::is_whitespace) {
                    return None;
                }
                rest
            }
        }
    };

    let question = question.trim();
    if question.is_empty() {
        None
    } else {
        Some(question.to_string())
    }
}

/// Strip `word` from the start of `text` if it is followed by whitespace or
/// the end of the text.
fn strip_word<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    if word.is_empty() {
        return None;
    }
    let rest = text.strip_prefix(word)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

fn mentions_bot(event: &InboundEvent, rules: &TriggerRules) -> bool {
    let Some(bot_id) = rules.bot_id.as_deref() else {
        return false;
    };
    event
        .mentions
        .iter()
        .any(|m| m.key == FIRST_MENTION_KEY && m.id == bot_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbridge_types::event::Mention;

    fn rules() -> TriggerRules {
        TriggerRules {
            bot_id: Some("ou_bot".to_string()),
            command_prefix: "/chatgpt".to_string(),
        }
    }

    fn event(kind: ChatKind, text: &str, mentions: Vec<Mention>) -> InboundEvent {
        InboundEvent {
            event_id: "evt-1".to_string(),
            chat_id: "oc_1".to_string(),
            chat_kind: kind,
            sender_id: "ou_user".to_string(),
            text: text.to_string(),
            mentions,
        }
    }

    fn bot_mention() -> Vec<Mention> {
        vec![Mention {
            key: FIRST_MENTION_KEY.to_string(),
            id: "ou_bot".to_string(),
        }]
    }

    #[test]
    fn test_direct_chat_uses_whole_text() {
        let e = event(ChatKind::Direct, "  what is rust?  ", vec![]);
        assert_eq!(extract_question(&e, &rules()).as_deref(), Some("what is rust?"));
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let e = event(ChatKind::Direct, "   \n ", vec![]);
        assert_eq!(extract_question(&e, &rules()), None);
    }

    #[test]
    fn test_group_mention_of_bot() {
        let e = event(ChatKind::Group, "@_user_1 hello there", bot_mention());
        assert_eq!(extract_question(&e, &rules()).as_deref(), Some("hello there"));
    }

    #[test]
    fn test_group_mention_of_someone_else() {
        let other = vec![Mention {
            key: FIRST_MENTION_KEY.to_string(),
            id: "ou_someone".to_string(),
        }];
        let e = event(ChatKind::Group, "@_user_1 hello", other);
        assert_eq!(extract_question(&e, &rules()), None);
    }

    #[test]
    fn test_group_mention_without_bot_id() {
        let e = event(ChatKind::Group, "@_user_1 hello", bot_mention());
        let rules = TriggerRules {
            bot_id: None,
            ..rules()
        };
        assert_eq!(extract_question(&e, &rules), None);
    }

    #[test]
    fn test_group_command_prefix() {
        let e = event(ChatKind::Group, "/chatgpt  tell me a joke", vec![]);
        assert_eq!(extract_question(&e, &rules()).as_deref(), Some("tell me a joke"));
    }

    #[test]
    fn test_group_command_needs_separator_and_argument() {
        for text in ["/chatgptfoo", "/chatgpt", "/chatgpt   "] {
            let e = event(ChatKind::Group, text, vec![]);
            assert_eq!(extract_question(&e, &rules()), None, "text: {text:?}");
        }
    }

    #[test]
    fn test_group_plain_text_is_ignored() {
        let e = event(ChatKind::Group, "just chatting", bot_mention());
        assert_eq!(extract_question(&e, &rules()), None);
    }

    #[test]
    fn test_group_mention_only_is_ignored() {
        let e = event(ChatKind::Group, "@_user_1", bot_mention());
        assert_eq!(extract_question(&e, &rules()), None);
    }

    #[test]
    fn test_longer_placeholder_is_not_first_mention() {
        let e = event(ChatKind::Group, "@_user_10 hi", bot_mention());
        assert_eq!(extract_question(&e, &rules()), None);
    }
}
