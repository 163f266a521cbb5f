//! Token cost accounting for conversation histories.
//!
//! Costs follow the chat-completions accounting recipe: a fixed overhead per
//! message, the BPE token length of its content, and one extra token when a
//! `name` field is present.

use tiktoken_rs::CoreBPE;

use banter_core::types::ChatMessage;

use crate::error::{Result, SessionError};

/// Fixed token overhead charged per message (role framing).
const MESSAGE_OVERHEAD: usize = 4;
/// Extra token charged when a message carries a `name`.
const NAME_OVERHEAD: usize = 1;

pub struct TokenAccountant {
    bpe: CoreBPE,
}

impl TokenAccountant {
    /// Build the cl100k_base tokenizer. Construction happens once at
    /// startup; failure is a startup error.
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| SessionError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }

    pub fn message_cost(&self, message: &ChatMessage) -> usize {
        let mut cost = MESSAGE_OVERHEAD + self.bpe.encode_with_special_tokens(&message.content).len();
        if message.name.is_some() {
            cost += NAME_OVERHEAD;
        }
        cost
    }

    pub fn history_cost(&self, history: &[ChatMessage]) -> usize {
        history.iter().map(|m| self.message_cost(m)).sum()
    }

    /// Drop oldest non-system entries until the history fits the budget.
    ///
    /// `history[0]` (the system prompt) is never removed. When even
    /// `[system]` alone exceeds the budget, everything else is still dropped
    /// and `[system]` remains.
    pub fn trim(&self, history: &mut Vec<ChatMessage>, budget: usize) {
        while self.history_cost(history) > budget && history.len() > 1 {
            history.remove(1);
        }
    }
}
