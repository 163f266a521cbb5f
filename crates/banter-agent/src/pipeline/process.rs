//! Full prompt turn — shared by any channel adapter.
//!
//! `process_prompt` runs everything between an accepted prompt and the
//! committed assistant turn: reset policy → turn accounting → history trim →
//! streaming reply → history commit. The adapter only handles
//! platform-specific concerns (reactions, typing, error fallback messages).

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use banter_core::config::BanterConfig;
use banter_core::types::ChatMessage;
use banter_sessions::{should_reset, SessionStore, TokenAccountant};

use crate::provider::{ChatRequest, CompletionProvider};

use super::respond::{stream_reply, TurnError};
use super::sink::ChatSink;

/// Result of a completed turn.
#[derive(Debug)]
pub struct TurnOutcome {
    /// Full raw model response, as committed to history.
    pub reply: String,
    /// Whether the session was auto-reset before this prompt.
    pub did_reset: bool,
}

/// Run one accepted prompt against a channel's session.
///
/// The session lock is held only for the short synchronous phases (reset
/// decision, turn accounting, trim, commit) — never across the completion
/// call. On a failed stream the partial assistant turn is discarded: history
/// keeps the user entry but gains no assistant entry, and the error
/// propagates to the adapter.
pub async fn process_prompt(
    provider: Arc<dyn CompletionProvider>,
    sink: &dyn ChatSink,
    store: &SessionStore,
    accountant: &TokenAccountant,
    config: &BanterConfig,
    channel: u64,
    text: &str,
    now: DateTime<Utc>,
) -> Result<TurnOutcome, TurnError> {
    let chat = &config.chat;

    let (did_reset, messages) = store
        .with(channel, |session| {
            let reset = should_reset(
                session,
                chat.max_turns,
                Duration::seconds(chat.reset_delta_secs),
                now,
            );
            if reset {
                session.reset();
            }
            session.note_prompt(now);
            session.push(ChatMessage::user(text));
            accountant.trim(session.history_mut(), chat.max_tokens);
            (reset, session.history().to_vec())
        })
        .ok_or(TurnError::UnknownChannel(channel))?;

    if did_reset {
        info!(channel, "session auto-reset before prompt");
        sink.post(&chat.reset_message).await?;
    }

    let req = ChatRequest {
        model: config.provider.model.clone(),
        messages,
        max_tokens: config.provider.reply_max_tokens,
        stream: true,
    };

    let reply = stream_reply(provider, sink, req, chat).await?;

    // The assistant turn is committed exactly once, and only on success.
    store
        .with(channel, |session| {
            session.push(ChatMessage::assistant(reply.clone()))
        })
        .ok_or(TurnError::UnknownChannel(channel))?;

    Ok(TurnOutcome { reply, did_reset })
}
