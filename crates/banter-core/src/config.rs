use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level config (banter.toml + BANTER_* env overrides).
///
/// `discord.bot_token`, `discord.target_channels`, `provider.api_key` and
/// `chat.system_prompt` have no defaults — a config without them fails to
/// load and the process does not start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanterConfig {
    pub discord: DiscordConfig,
    pub provider: ProviderConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    /// Channel IDs the bot listens on. One session is created per entry at
    /// startup; messages from any other channel are ignored.
    pub target_channels: Vec<u64>,
    /// Accepted command prefixes. The first entry is canonical: every other
    /// prefix is rewritten to it before command matching.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: Vec<String>,
    #[serde(default = "default_help_command")]
    pub help_command: Vec<String>,
    #[serde(default = "default_reset_command")]
    pub reset_command: Vec<String>,
    /// Help reply template. `{done}`, `{pending}`, `{help}` and `{reset}`
    /// placeholders are substituted at render time.
    #[serde(default = "default_help_message")]
    pub help_message: String,
    /// Reaction attached to a prompt that arrives while the channel is busy.
    /// Unicode emoji or the `<:name:id>` custom-emoji form.
    #[serde(default = "default_emoji_pending")]
    pub emoji_pending: String,
    /// Reaction attached to a prompt once its reply has been delivered.
    #[serde(default = "default_emoji_done")]
    pub emoji_done: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Request/response timeout for the completion call, streaming included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `max_tokens` sent with each completion request.
    #[serde(default = "default_reply_max_tokens")]
    pub reply_max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Seed message; always `history[0]` of every session.
    pub system_prompt: String,
    /// Token budget the trimmed history must fit in.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Optional turn-count reset trigger. `None` disables it.
    #[serde(default)]
    pub max_turns: Option<u32>,
    /// Idle-time reset trigger, in seconds.
    #[serde(default = "default_reset_delta_secs")]
    pub reset_delta_secs: i64,
    /// Characters that end a natural flush boundary during streaming.
    #[serde(default = "default_delimiters")]
    pub delimiters: String,
    /// Hard flush boundary: rendered text reaching this length finalizes the
    /// current outgoing message and starts a new one.
    #[serde(default = "default_max_response_length")]
    pub max_response_length: usize,
    #[serde(default = "default_reset_message")]
    pub reset_message: String,
    #[serde(default = "default_waiting_message")]
    pub waiting_message: String,
    #[serde(default = "default_error_message")]
    pub error_message: String,
    #[serde(default = "default_empty_response_message")]
    pub empty_response_message: String,
}

fn default_command_prefix() -> Vec<String> {
    vec!["!".to_string()]
}
fn default_help_command() -> Vec<String> {
    vec!["help".to_string()]
}
fn default_reset_command() -> Vec<String> {
    vec!["reset".to_string()]
}
fn default_help_message() -> String {
    concat!(
        "I reply to every message in this channel.\n",
        "{pending} means I'm still on an earlier prompt — try again shortly.\n",
        "{done} marks a prompt I have answered.\n",
        "Commands: {help} shows this message, {reset} starts the conversation over."
    )
    .to_string()
}
fn default_emoji_pending() -> String {
    "\u{23f3}".to_string() // ⏳
}
fn default_emoji_done() -> String {
    "\u{2705}".to_string() // ✅
}
fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_reply_max_tokens() -> u32 {
    1024
}
fn default_max_tokens() -> usize {
    3000
}
fn default_reset_delta_secs() -> i64 {
    3600
}
fn default_delimiters() -> String {
    ".!?\u{3002}\u{ff01}\u{ff1f}".to_string()
}
fn default_max_response_length() -> usize {
    1900
}
fn default_reset_message() -> String {
    "Conversation reset — starting fresh.".to_string()
}
fn default_waiting_message() -> String {
    "…".to_string()
}
fn default_error_message() -> String {
    "Something went wrong talking to the model. Please try again.".to_string()
}
fn default_empty_response_message() -> String {
    "(no response)".to_string()
}

impl BanterConfig {
    /// Load config from a TOML file with BANTER_* env var overrides.
    ///
    /// A missing or malformed required option is fatal: the error propagates
    /// to `main` and the process never starts.
    pub fn load(path: &str) -> crate::error::Result<Self> {
        let config: BanterConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("BANTER_").split("_"))
            .extract()
            .map_err(|e| crate::error::BanterError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.discord.target_channels.is_empty() {
            return Err(crate::error::BanterError::Config(
                "discord.target_channels must not be empty".to_string(),
            ));
        }
        if self.discord.command_prefix.is_empty() {
            return Err(crate::error::BanterError::Config(
                "discord.command_prefix must not be empty".to_string(),
            ));
        }
        if self.chat.max_response_length == 0 {
            return Err(crate::error::BanterError::Config(
                "chat.max_response_length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
