//! Intent classification
//!
//! An ordered rule table maps a normalized utterance to exactly one intent.
//! Rule order is significant: several patterns are substrings of broader
//! ones, so the first matching rule wins. A pending follow-up in the
//! conversation context takes precedence over every stateless rule.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::{ConversationContext, FollowUp};

/// A classified utterance
///
/// The matcher produces everything except `Info`, `NoAnswer`, and `Offline`,
/// which are resolution tags assigned by the dialogue processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Reply consuming a pending follow-up
    FollowUpReply,
    Greeting,
    HowAreYou,
    Identity,
    Creator,
    Thanks,
    About,
    Love,
    LightOn,
    LightOff,
    Joke,
    Weather,
    /// Word-definition request; `term` may be empty after stripping
    Definition { term: String },
    /// Nothing matched; resolved via the general-knowledge fallback chain
    GeneralQuery,
    /// General query answered by a knowledge connector
    Info,
    /// General query that exhausted the fallback chain
    NoAnswer,
    /// Turn short-circuited by the connectivity gate
    Offline,
}

impl Intent {
    /// Stable tag name, used for logging and transcripts
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::FollowUpReply => "response",
            Self::Greeting => "greeting",
            Self::HowAreYou => "how-are-you",
            Self::Identity => "identity",
            Self::Creator => "creator",
            Self::Thanks => "thanks",
            Self::About => "about",
            Self::Love => "love",
            Self::LightOn => "light-on",
            Self::LightOff => "light-off",
            Self::Joke => "joke",
            Self::Weather => "weather",
            Self::Definition { .. } => "definition",
            Self::GeneralQuery => "general-query",
            Self::Info => "info",
            Self::NoAnswer => "no-answer",
            Self::Offline => "offline",
        }
    }
}

/// Normalize a raw transcript into an utterance (lowercased, trimmed)
#[must_use]
pub fn normalize(transcript: &str) -> String {
    transcript.trim().to_lowercase()
}

struct Rule {
    pattern: &'static str,
    intent: fn(&str) -> Intent,
}

/// Stateless rules, evaluated top-to-bottom; first match wins.
/// The order mirrors the dispatch order of the conversational flow and must
/// not be rearranged (e.g. "whats up" would otherwise be shadowed by the
/// general fallback, and "turn on the light" also contains "light").
const RULES: &[Rule] = &[
    Rule {
        pattern: r"\b(hi|hello|hey|yo|buddy|sup|whats up)\b",
        intent: |_| Intent::Greeting,
    },
    Rule {
        pattern: r"how (are|r) (you|u)",
        intent: |_| Intent::HowAreYou,
    },
    Rule {
        pattern: r"what('?s| is) your name|who are you",
        intent: |_| Intent::Identity,
    },
    Rule {
        pattern: r"who (made|created) you",
        intent: |_| Intent::Creator,
    },
    Rule {
        pattern: r"thank(s| you)",
        intent: |_| Intent::Thanks,
    },
    Rule {
        pattern: r"tell me about yourself",
        intent: |_| Intent::About,
    },
    Rule {
        pattern: r"do you love me",
        intent: |_| Intent::Love,
    },
    Rule {
        pattern: r"turn on.*light",
        intent: |_| Intent::LightOn,
    },
    Rule {
        pattern: r"turn off.*light",
        intent: |_| Intent::LightOff,
    },
    Rule {
        pattern: r"joke",
        intent: |_| Intent::Joke,
    },
    Rule {
        pattern: r"weather",
        intent: |_| Intent::Weather,
    },
    Rule {
        pattern: r"define",
        intent: |utterance| Intent::Definition {
            term: strip_trigger(utterance, "define"),
        },
    },
];

/// Continuation pattern that resolves a pending `how-are-you` follow-up
static CONTINUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(i('|\u{2019})m|i am|doing|feeling)").expect("continuation regex")
});

static COMPILED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| Regex::new(rule.pattern).expect("rule regex"))
        .collect()
});

/// Classify a normalized utterance against the rule table
///
/// Returns exactly one intent; `GeneralQuery` when nothing matches. The
/// context-sensitive follow-up rule is checked before all stateless rules.
#[must_use]
pub fn classify(utterance: &str, context: &ConversationContext) -> Intent {
    if context.pending() == Some(FollowUp::HowAreYou) && CONTINUATION.is_match(utterance) {
        return Intent::FollowUpReply;
    }

    for (rule, regex) in RULES.iter().zip(COMPILED.iter()) {
        if regex.is_match(utterance) {
            return (rule.intent)(utterance);
        }
    }

    Intent::GeneralQuery
}

/// Remove the first occurrence of the trigger keyword and trim the remainder
fn strip_trigger(utterance: &str, trigger: &str) -> String {
    utterance.replacen(trigger, "", 1).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stateless(utterance: &str) -> Intent {
        classify(utterance, &ConversationContext::new(5))
    }

    #[test]
    fn greeting_variants() {
        for u in ["hi", "hello there", "hey buddy", "whats up"] {
            assert_eq!(stateless(u), Intent::Greeting, "utterance: {u}");
        }
    }

    #[test]
    fn greeting_needs_word_boundary() {
        // "hi" inside "hindi" must not greet
        assert_eq!(
            stateless("translate hindi for me"),
            Intent::GeneralQuery
        );
    }

    #[test]
    fn small_talk_rules() {
        assert_eq!(stateless("how are you"), Intent::HowAreYou);
        assert_eq!(stateless("how r u"), Intent::HowAreYou);
        assert_eq!(stateless("what is your name"), Intent::Identity);
        assert_eq!(stateless("who are you"), Intent::Identity);
        assert_eq!(stateless("who made you"), Intent::Creator);
        assert_eq!(stateless("thanks a lot"), Intent::Thanks);
        assert_eq!(stateless("tell me about yourself"), Intent::About);
        assert_eq!(stateless("do you love me"), Intent::Love);
    }

    #[test]
    fn light_commands() {
        assert_eq!(stateless("turn on the light"), Intent::LightOn);
        assert_eq!(stateless("please turn off the bedroom light"), Intent::LightOff);
    }

    #[test]
    fn definition_extracts_term() {
        assert_eq!(
            stateless("define gravity"),
            Intent::Definition {
                term: "gravity".to_string()
            }
        );
    }

    #[test]
    fn definition_strips_only_first_trigger() {
        assert_eq!(
            stateless("define define"),
            Intent::Definition {
                term: "define".to_string()
            }
        );
    }

    #[test]
    fn definition_empty_term() {
        assert_eq!(
            stateless("define"),
            Intent::Definition {
                term: String::new()
            }
        );
    }

    #[test]
    fn first_match_wins_over_later_rules() {
        // Contains both a greeting and "joke"; the greeting rule is earlier
        assert_eq!(stateless("hey tell me a joke"), Intent::Greeting);
    }

    #[test]
    fn fallback_is_general_query() {
        assert_eq!(stateless("capital of france"), Intent::GeneralQuery);
    }

    #[test]
    fn follow_up_takes_precedence() {
        let mut context = ConversationContext::new(5);
        context.set_pending(FollowUp::HowAreYou);

        // "i am doing great" also matches nothing stateless, but even an
        // utterance matching a stateless rule resolves via the follow-up
        assert_eq!(classify("i am doing great", &context), Intent::FollowUpReply);
        assert_eq!(
            classify("feeling good thanks", &context),
            Intent::FollowUpReply
        );
    }

    #[test]
    fn follow_up_requires_pending_slot() {
        let context = ConversationContext::new(5);
        assert_eq!(classify("i am doing great", &context), Intent::GeneralQuery);
    }

    #[test]
    fn curly_apostrophe_continuation() {
        let mut context = ConversationContext::new(5);
        context.set_pending(FollowUp::HowAreYou);
        assert_eq!(classify("i\u{2019}m fine", &context), Intent::FollowUpReply);
    }

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize("  Tell Me A JOKE  "), "tell me a joke");
    }
}
