//! Serenity event handler wired to the session pipeline.

use std::sync::Arc;

use chrono::Utc;
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::{Context, EventHandler};
use tracing::{info, warn};

use banter_agent::pipeline::process_prompt;
use banter_agent::CompletionProvider;
use banter_core::BanterConfig;
use banter_sessions::{SessionStore, TokenAccountant};

use crate::ack;
use crate::commands::{CommandRouter, Route};
use crate::sink::DiscordSink;
use crate::typing::TypingHandle;

/// Everything one turn needs, shared across handler invocations.
pub struct BotState {
    pub config: BanterConfig,
    pub store: Arc<SessionStore>,
    pub accountant: TokenAccountant,
    pub provider: Arc<dyn CompletionProvider>,
    pub router: CommandRouter,
}

pub struct BanterHandler {
    state: Arc<BotState>,
}

impl BanterHandler {
    pub fn new(state: BotState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }
}

#[async_trait]
impl EventHandler for BanterHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            name = %ready.user.name,
            channels = self.state.config.discord.target_channels.len(),
            "connected, ready"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let channel = msg.channel_id.get();
        if !self.state.store.contains(channel) {
            return;
        }

        let discord = &self.state.config.discord;
        match self.state.router.route(&msg.content) {
            Route::Ignore => return,
            Route::Help => {
                let help = self.state.router.help_text(discord);
                if let Err(e) = msg.channel_id.say(&ctx.http, help).await {
                    warn!(channel, error = %e, "failed to send help");
                }
                return;
            }
            Route::Reset => {
                // Explicit reset works even while the channel is busy.
                self.state.store.reset(channel);
                info!(channel, "session reset by command");
                if let Err(e) = msg
                    .channel_id
                    .say(&ctx.http, self.state.config.chat.reset_message.as_str())
                    .await
                {
                    warn!(channel, error = %e, "failed to confirm reset");
                }
                return;
            }
            Route::Prompt => {}
        }

        // One in-flight completion per channel: losers get the pending
        // reaction and nothing else.
        let Some(guard) = SessionStore::try_begin(&self.state.store, channel) else {
            ack::react(&ctx.http, msg.channel_id, msg.id, &discord.emoji_pending).await;
            return;
        };

        info!(channel, author = %msg.author.name, content = %msg.content, "prompt accepted");

        let state = Arc::clone(&self.state);
        let http = Arc::clone(&ctx.http);
        let channel_id = msg.channel_id;
        let message_id = msg.id;
        let content = msg.content.clone();

        tokio::spawn(async move {
            // Busy is released when this guard drops, whatever the outcome.
            let _guard = guard;

            let typing = TypingHandle::start(Arc::clone(&http), channel_id);
            let sink = DiscordSink::new(Arc::clone(&http), channel_id);

            let result = process_prompt(
                Arc::clone(&state.provider),
                &sink,
                &state.store,
                &state.accountant,
                &state.config,
                channel,
                &content,
                Utc::now(),
            )
            .await;

            typing.stop();

            match result {
                Ok(outcome) => {
                    info!(channel, reply = %outcome.reply, "prompt answered");
                }
                Err(e) => {
                    warn!(channel, error = %e, "turn failed");
                    if let Err(e) = channel_id
                        .say(&http, state.config.chat.error_message.as_str())
                        .await
                    {
                        warn!(channel, error = %e, "failed to send error fallback");
                    }
                }
            }

            ack::react(&http, channel_id, message_id, &state.config.discord.emoji_done).await;
        });
    }
}
