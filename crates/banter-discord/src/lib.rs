pub mod ack;
pub mod commands;
pub mod handler;
pub mod sink;
pub mod typing;

pub use commands::{CommandRouter, Route};
pub use handler::{BanterHandler, BotState};
pub use sink::DiscordSink;
