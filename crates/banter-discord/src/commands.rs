//! Control-command routing, intercepted before the LLM pipeline.
//!
//! Matching is case-insensitive and prefix-normalized: every accepted prefix
//! is rewritten to the canonical one (the first configured entry) before
//! comparison, so `！help` and `!HELP` both hit the help command.

use banter_core::config::DiscordConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Nothing to do: empty content, an unknown command, or a bare emoji.
    Ignore,
    Help,
    Reset,
    /// Ordinary prompt — forward the original content to the pipeline.
    Prompt,
}

pub struct CommandRouter {
    prefixes: Vec<String>,
    primary: String,
    help_aliases: Vec<String>,
    reset_aliases: Vec<String>,
}

impl CommandRouter {
    /// `discord.command_prefix` is validated non-empty at config load.
    pub fn new(discord: &DiscordConfig) -> Self {
        Self {
            primary: discord.command_prefix[0].clone(),
            prefixes: discord.command_prefix.clone(),
            help_aliases: discord.help_command.clone(),
            reset_aliases: discord.reset_command.clone(),
        }
    }

    pub fn route(&self, content: &str) -> Route {
        let msg = self.normalize(content);

        if msg.is_empty() {
            return Route::Ignore;
        }
        if self.matches(&msg, &self.help_aliases) {
            return Route::Help;
        }
        if self.matches(&msg, &self.reset_aliases) {
            return Route::Reset;
        }
        // Unknown commands are skipped, not answered.
        if msg.starts_with(&self.primary) {
            return Route::Ignore;
        }
        // Bare server emoji like <:partyparrot:1234>.
        if msg.starts_with('<') && msg.ends_with('>') {
            return Route::Ignore;
        }
        Route::Prompt
    }

    fn normalize(&self, content: &str) -> String {
        let mut msg = content.to_lowercase();
        for prefix in &self.prefixes {
            if prefix != &self.primary {
                msg = msg.replace(prefix.as_str(), &self.primary);
            }
        }
        msg.trim().to_string()
    }

    fn matches(&self, msg: &str, aliases: &[String]) -> bool {
        aliases
            .iter()
            .any(|alias| format!("{}{}", self.primary, alias.to_lowercase()) == msg)
    }

    /// Render the configured help template.
    pub fn help_text(&self, discord: &DiscordConfig) -> String {
        discord
            .help_message
            .replace("{done}", &discord.emoji_done)
            .replace("{pending}", &discord.emoji_pending)
            .replace("{help}", &backtick_list(&self.primary, &self.help_aliases))
            .replace("{reset}", &backtick_list(&self.primary, &self.reset_aliases))
    }
}

/// `["help", "h"]` with prefix `!` → `` `!help`, `!h` ``
fn backtick_list(prefix: &str, aliases: &[String]) -> String {
    aliases
        .iter()
        .map(|alias| format!("`{prefix}{alias}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
