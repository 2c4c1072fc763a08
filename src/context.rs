//! Short-term conversational context
//!
//! Holds one optional pending follow-up plus a bounded FIFO history of
//! recent turns. Mutated only by the dialogue processor, strictly at turn
//! boundaries.

use std::collections::VecDeque;

use crate::intent::Intent;

/// A follow-up the assistant is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// "What about you?" — awaiting the user's reply
    HowAreYou,
}

/// One completed conversational turn
#[derive(Debug, Clone)]
pub struct TurnRecord {
    pub utterance: String,
    pub response: String,
    pub intent: Intent,
}

/// Pending follow-up slot plus bounded turn history
#[derive(Debug, Clone)]
pub struct ConversationContext {
    pending: Option<FollowUp>,
    history: VecDeque<TurnRecord>,
    limit: usize,
}

impl ConversationContext {
    /// Create an empty context retaining at most `limit` turns
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            pending: None,
            history: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// The pending follow-up, if any
    #[must_use]
    pub fn pending(&self) -> Option<FollowUp> {
        self.pending
    }

    /// Arm a follow-up, superseding any previous one
    pub fn set_pending(&mut self, follow_up: FollowUp) {
        self.pending = Some(follow_up);
    }

    /// Clear the pending follow-up (consumed or superseded)
    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    /// Append a turn, evicting the oldest once over the limit
    pub fn push(&mut self, record: TurnRecord) {
        if self.history.len() >= self.limit {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    /// Recent turns, oldest first
    #[must_use]
    pub fn history(&self) -> impl Iterator<Item = &TurnRecord> {
        self.history.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: usize) -> TurnRecord {
        TurnRecord {
            utterance: format!("utterance {n}"),
            response: format!("response {n}"),
            intent: Intent::Info,
        }
    }

    #[test]
    fn history_bounded_fifo() {
        let mut context = ConversationContext::new(5);
        for n in 0..8 {
            context.push(record(n));
        }

        assert_eq!(context.len(), 5);
        let utterances: Vec<_> = context.history().map(|r| r.utterance.as_str()).collect();
        assert_eq!(
            utterances,
            [
                "utterance 3",
                "utterance 4",
                "utterance 5",
                "utterance 6",
                "utterance 7"
            ]
        );
    }

    #[test]
    fn pending_set_and_clear() {
        let mut context = ConversationContext::new(5);
        assert_eq!(context.pending(), None);

        context.set_pending(FollowUp::HowAreYou);
        assert_eq!(context.pending(), Some(FollowUp::HowAreYou));

        context.clear_pending();
        assert_eq!(context.pending(), None);
    }
}
