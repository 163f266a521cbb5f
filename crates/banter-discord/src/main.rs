use std::sync::Arc;

use clap::Parser;
use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tracing::info;

use banter_agent::{CompletionProvider, OpenAiProvider};
use banter_core::BanterConfig;
use banter_discord::{BanterHandler, BotState, CommandRouter};
use banter_sessions::{SessionStore, TokenAccountant};

#[derive(Parser)]
#[command(name = "banter", version, about = "Per-channel Discord chat bot backed by a streaming LLM")]
struct Args {
    /// Path to the TOML config file (BANTER_* env vars override it).
    #[arg(long, default_value = "banter.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banter=info,banter_discord=info,banter_agent=info".into()),
        )
        .init();

    let args = Args::parse();

    // Config errors are fatal: the bot cannot run half-configured.
    let config = BanterConfig::load(&args.config)?;

    let accountant = TokenAccountant::new()?;
    let store = Arc::new(SessionStore::new(
        &config.discord.target_channels,
        &config.chat.system_prompt,
    ));
    let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiProvider::new(&config.provider)?);
    let router = CommandRouter::new(&config.discord);

    info!(
        channels = config.discord.target_channels.len(),
        model = %config.provider.model,
        "starting Discord client"
    );

    let token = config.discord.bot_token.clone();
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    let handler = BanterHandler::new(BotState {
        config,
        store,
        accountant,
        provider,
        router,
    });

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await?;
    client.start().await?;

    Ok(())
}
