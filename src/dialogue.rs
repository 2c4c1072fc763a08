//! Dialogue turn processing
//!
//! One call per conversational turn: gate on connectivity, classify the
//! utterance, dispatch to a connector where needed, derive the response
//! text, and update the conversational context. The caller hands the
//! resulting text to speech output.

use std::sync::Arc;

use crate::connectors::{Knowledge, LightSwitch};
use crate::context::{ConversationContext, FollowUp, TurnRecord};
use crate::intent::{self, Intent};

/// Minimum useful answer length for the general-knowledge fallback chain.
/// Shorter results count as "no answer", not just empty ones.
const MIN_ANSWER_LEN: usize = 5;

/// Fixed responses
const OFFLINE_TEXT: &str = "You are currently offline. I can only do basic tasks.";
const GREETING_TEXT: &str = "Hey there! How can I help?";
const HOW_ARE_YOU_TEXT: &str = "I'm doing great! What about you?";
const FOLLOW_UP_TEXT: &str = "Glad to hear that!";
const IDENTITY_TEXT: &str = "I am Odel, your voice assistant buddy.";
const CREATOR_TEXT: &str = "I was created by Niranjan. That's all I know.";
const THANKS_TEXT: &str = "You're welcome!";
const ABOUT_TEXT: &str = "I'm Odel, a voice assistant built to answer, help, and chat with you.";
const LOVE_TEXT: &str = "Of course! You're my favorite human.";
const LIGHT_ON_TEXT: &str = "Light turned on.";
const LIGHT_OFF_TEXT: &str = "Light turned off.";
const LIGHT_FAILED_TEXT: &str = "Failed to control the light. Check your connection.";
const NO_ANSWER_TEXT: &str = "I couldn't find a good answer for that. Try rephrasing?";
const DEFINE_WHAT_TEXT: &str = "What word should I define?";
const NO_DEFINITION_TEXT: &str = "No definition found.";

/// Outcome of one turn, consumed by the speech-output boundary
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Text to speak
    pub text: String,
    /// Resolved intent tag
    pub intent: Intent,
}

/// Processes conversational turns against the connector set
pub struct DialogueProcessor {
    knowledge: Arc<dyn Knowledge>,
    light: Arc<dyn LightSwitch>,
}

impl DialogueProcessor {
    /// Create a processor over the given connectors
    #[must_use]
    pub fn new(knowledge: Arc<dyn Knowledge>, light: Arc<dyn LightSwitch>) -> Self {
        Self { knowledge, light }
    }

    /// Process one turn
    ///
    /// `transcript` is the raw recognizer output; it is normalized here.
    /// When `online` is false no connector is invoked and the fixed offline
    /// response is returned for every utterance.
    pub async fn process_turn(
        &self,
        transcript: &str,
        context: &mut ConversationContext,
        online: bool,
    ) -> TurnResult {
        let utterance = intent::normalize(transcript);

        if !online {
            let result = TurnResult {
                text: OFFLINE_TEXT.to_string(),
                intent: Intent::Offline,
            };
            record(context, &utterance, &result);
            return result;
        }

        let matched = intent::classify(&utterance, context);
        tracing::debug!(utterance = %utterance, intent = matched.tag(), "classified");

        let result = self.dispatch(matched, &utterance).await;

        // Context updates happen strictly at the turn boundary: arm the
        // follow-up on how-are-you, clear it on anything else.
        if result.intent == Intent::HowAreYou {
            context.set_pending(FollowUp::HowAreYou);
        } else {
            context.clear_pending();
        }
        record(context, &utterance, &result);

        tracing::info!(intent = result.intent.tag(), response = %result.text, "turn resolved");
        result
    }

    async fn dispatch(&self, matched: Intent, utterance: &str) -> TurnResult {
        let canned = |text: &str, intent: Intent| TurnResult {
            text: text.to_string(),
            intent,
        };

        match matched {
            Intent::FollowUpReply => canned(FOLLOW_UP_TEXT, Intent::FollowUpReply),
            Intent::Greeting => canned(GREETING_TEXT, Intent::Greeting),
            Intent::HowAreYou => canned(HOW_ARE_YOU_TEXT, Intent::HowAreYou),
            Intent::Identity => canned(IDENTITY_TEXT, Intent::Identity),
            Intent::Creator => canned(CREATOR_TEXT, Intent::Creator),
            Intent::Thanks => canned(THANKS_TEXT, Intent::Thanks),
            Intent::About => canned(ABOUT_TEXT, Intent::About),
            Intent::Love => canned(LOVE_TEXT, Intent::Love),
            Intent::LightOn => self.switch_light(true).await,
            Intent::LightOff => self.switch_light(false).await,
            Intent::Joke => TurnResult {
                text: self.knowledge.joke().await,
                intent: Intent::Joke,
            },
            Intent::Weather => TurnResult {
                text: self.knowledge.weather().await,
                intent: Intent::Weather,
            },
            Intent::Definition { term } => self.define(term).await,
            Intent::GeneralQuery => self.general_query(utterance).await,
            // Resolution-only tags never come out of the matcher
            Intent::Info | Intent::NoAnswer | Intent::Offline => {
                canned(NO_ANSWER_TEXT, Intent::NoAnswer)
            }
        }
    }

    async fn switch_light(&self, on: bool) -> TurnResult {
        let intent = if on { Intent::LightOn } else { Intent::LightOff };
        match self.light.set_light(on).await {
            Ok(()) => TurnResult {
                text: if on { LIGHT_ON_TEXT } else { LIGHT_OFF_TEXT }.to_string(),
                intent,
            },
            Err(e) => {
                tracing::warn!(error = %e, "light control failed");
                TurnResult {
                    text: LIGHT_FAILED_TEXT.to_string(),
                    intent,
                }
            }
        }
    }

    async fn define(&self, term: String) -> TurnResult {
        // An empty term is valid matcher output ("define" alone); ask for
        // clarification instead of querying the dictionary with it.
        if term.is_empty() {
            return TurnResult {
                text: DEFINE_WHAT_TEXT.to_string(),
                intent: Intent::Definition { term },
            };
        }

        let mut meaning = self.knowledge.definition(&term).await;
        if meaning.is_empty() {
            meaning = NO_DEFINITION_TEXT.to_string();
        }

        TurnResult {
            text: format!("Definition of {term}: {meaning}"),
            intent: Intent::Definition { term },
        }
    }

    async fn general_query(&self, utterance: &str) -> TurnResult {
        let mut answer = self.knowledge.answer(utterance).await;

        if answer.len() < MIN_ANSWER_LEN {
            answer = self.knowledge.summary(utterance).await;
        }

        if answer.len() < MIN_ANSWER_LEN {
            TurnResult {
                text: NO_ANSWER_TEXT.to_string(),
                intent: Intent::NoAnswer,
            }
        } else {
            TurnResult {
                text: answer,
                intent: Intent::Info,
            }
        }
    }
}

fn record(context: &mut ConversationContext, utterance: &str, result: &TurnResult) {
    context.push(TurnRecord {
        utterance: utterance.to_string(),
        response: result.text.clone(),
        intent: result.intent.clone(),
    });
}
