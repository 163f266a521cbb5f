//! Reaction markers on inbound messages.
//!
//! A prompt that arrives while the channel is busy gets the pending emoji; a
//! prompt whose turn has finished gets the done emoji. Reaction failures are
//! logged and swallowed — the bot may lack reaction permission.

use serenity::http::Http;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, EmojiId, MessageId};
use tracing::warn;

/// Parse a configured emoji string: plain unicode, or the `<:name:id>` /
/// `<a:name:id>` custom-emoji form.
pub fn parse_reaction(emoji: &str) -> Option<ReactionType> {
    let trimmed = emoji.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(body) = trimmed.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        let animated = body.starts_with("a:");
        let body = body.strip_prefix("a:").unwrap_or(body);
        let body = body.strip_prefix(':').unwrap_or(body);
        let (name, id) = body.rsplit_once(':')?;
        let id = id.parse::<u64>().ok().filter(|&id| id != 0)?;
        return Some(ReactionType::Custom {
            animated,
            id: EmojiId::new(id),
            name: Some(name.to_string()),
        });
    }

    Some(ReactionType::Unicode(trimmed.to_string()))
}

/// Attach the configured emoji to a message.
pub async fn react(http: &Http, channel_id: ChannelId, message_id: MessageId, emoji: &str) {
    let Some(reaction) = parse_reaction(emoji) else {
        warn!(emoji, "unparseable reaction emoji in config");
        return;
    };

    if let Err(e) = http.create_reaction(channel_id, message_id, &reaction).await {
        warn!(error = %e, channel = channel_id.get(), "failed to add reaction");
    }
}
