//! `ChatSink` implementation over the serenity HTTP client.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::EditMessage;
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};

use banter_agent::pipeline::{ChatSink, MessageRef, SinkError};

pub struct DiscordSink {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl ChatSink for DiscordSink {
    async fn post(&self, text: &str) -> Result<MessageRef, SinkError> {
        let message = self
            .channel_id
            .say(&self.http, text)
            .await
            .map_err(|e| SinkError(e.to_string()))?;
        Ok(MessageRef(message.id.get()))
    }

    async fn edit(&self, message: MessageRef, text: &str) -> Result<(), SinkError> {
        self.channel_id
            .edit_message(
                &self.http,
                MessageId::new(message.0),
                EditMessage::new().content(text),
            )
            .await
            .map_err(|e| SinkError(e.to_string()))?;
        Ok(())
    }
}
