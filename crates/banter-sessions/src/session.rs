use chrono::{DateTime, Utc};

use banter_core::types::ChatMessage;

/// One channel's conversation state.
///
/// `history[0]` is always the configured system prompt and is never removed;
/// trimming and resets only ever touch the entries after it.
#[derive(Debug)]
pub struct Session {
    history: Vec<ChatMessage>,
    turn_count: u32,
    last_activity: Option<DateTime<Utc>>,
    pub(crate) busy: bool,
}

impl Session {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            history: vec![ChatMessage::system(system_prompt)],
            turn_count: 0,
            last_activity: None,
            busy: false,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut Vec<ChatMessage> {
        &mut self.history
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Record an accepted prompt: stamp activity and count the turn.
    ///
    /// Called exactly once per accepted prompt, after the reset decision.
    pub fn note_prompt(&mut self, now: DateTime<Utc>) {
        self.last_activity = Some(now);
        self.turn_count += 1;
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.history.push(message);
    }

    /// Truncate history back to `[system]` and zero the turn counter.
    pub fn reset(&mut self) {
        self.history.truncate(1);
        self.turn_count = 0;
    }
}
