//! Test doubles shared by the pipeline tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use banter_core::config::{BanterConfig, ChatConfig, DiscordConfig, ProviderConfig};
use banter_core::types::ChatMessage;

use crate::provider::{ChatRequest, ChatResponse, CompletionProvider, ProviderError};
use crate::stream::StreamEvent;

use super::sink::{ChatSink, MessageRef, SinkError};

/// Emits a scripted fragment sequence, optionally failing mid-stream.
pub struct ScriptedProvider {
    fragments: Vec<String>,
    error_after_all: Option<String>,
}

impl ScriptedProvider {
    pub fn fragments(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            error_after_all: None,
        }
    }

    /// Emit every fragment, then an `Error` event instead of `Done`.
    pub fn failing_after(fragments: &[&str], message: &str) -> Self {
        Self {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            error_after_all: Some(message.to_string()),
        }
    }

    pub fn request() -> ChatRequest {
        ChatRequest {
            model: "test-model".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            max_tokens: 64,
            stream: true,
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(&self, _req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        Err(ProviderError::Unavailable(
            "scripted provider is stream-only".to_string(),
        ))
    }

    async fn send_stream(
        &self,
        _req: &ChatRequest,
        tx: mpsc::Sender<StreamEvent>,
    ) -> Result<(), ProviderError> {
        for fragment in &self.fragments {
            if tx
                .send(StreamEvent::TextDelta {
                    text: fragment.clone(),
                })
                .await
                .is_err()
            {
                return Ok(());
            }
        }
        let last = match &self.error_after_all {
            Some(message) => StreamEvent::Error {
                message: message.clone(),
            },
            None => StreamEvent::Done {
                model: "test-model".to_string(),
                tokens_in: 1,
                tokens_out: 1,
                stop_reason: "stop".to_string(),
            },
        };
        let _ = tx.send(last).await;
        Ok(())
    }
}

/// A provider with no streaming support — exercises the trait's default
/// `send_stream`, which falls back to one `TextDelta` plus `Done`.
pub struct SendOnlyProvider {
    pub content: String,
}

#[async_trait]
impl CompletionProvider for SendOnlyProvider {
    fn name(&self) -> &str {
        "send-only"
    }

    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        Ok(ChatResponse {
            content: self.content.clone(),
            model: req.model.clone(),
            tokens_in: 1,
            tokens_out: 1,
            stop_reason: "stop".to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Post { id: u64, text: String },
    Edit { id: u64, text: String },
}

/// Records every outbound call; message ids count up from 1.
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    next_id: AtomicU64,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().expect("sink mutex").clone()
    }

    /// Just the edit texts, in order.
    pub fn edits(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SinkCall::Edit { text, .. } => Some(text),
                SinkCall::Post { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatSink for RecordingSink {
    async fn post(&self, text: &str) -> Result<MessageRef, SinkError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().expect("sink mutex").push(SinkCall::Post {
            id,
            text: text.to_string(),
        });
        Ok(MessageRef(id))
    }

    async fn edit(&self, message: MessageRef, text: &str) -> Result<(), SinkError> {
        self.calls.lock().expect("sink mutex").push(SinkCall::Edit {
            id: message.0,
            text: text.to_string(),
        });
        Ok(())
    }
}

pub fn banter_config() -> BanterConfig {
    BanterConfig {
        discord: DiscordConfig {
            bot_token: "test-token".to_string(),
            target_channels: vec![42],
            command_prefix: vec!["!".to_string()],
            help_command: vec!["help".to_string()],
            reset_command: vec!["reset".to_string()],
            help_message: "help".to_string(),
            emoji_pending: "\u{23f3}".to_string(),
            emoji_done: "\u{2705}".to_string(),
        },
        provider: ProviderConfig {
            api_key: "sk-test".to_string(),
            base_url: "https://api.openai.com".to_string(),
            model: "test-model".to_string(),
            timeout_secs: 5,
            reply_max_tokens: 64,
        },
        chat: chat_config(),
    }
}

pub fn chat_config() -> ChatConfig {
    ChatConfig {
        system_prompt: "You are a test assistant.".to_string(),
        max_tokens: 3000,
        max_turns: None,
        reset_delta_secs: 3600,
        delimiters: ".!?".to_string(),
        max_response_length: 1900,
        reset_message: "Conversation reset — starting fresh.".to_string(),
        waiting_message: "…".to_string(),
        error_message: "Something went wrong talking to the model. Please try again.".to_string(),
        empty_response_message: "(no response)".to_string(),
    }
}
