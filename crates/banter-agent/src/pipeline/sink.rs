use async_trait::async_trait;

/// Identifier of an outgoing message, as assigned by the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(pub u64);

#[derive(Debug, thiserror::Error)]
#[error("chat sink error: {0}")]
pub struct SinkError(pub String);

/// Outbound surface of one channel, implemented by each platform adapter.
///
/// Defined here (in `banter-agent`) so the pipeline stays platform-agnostic:
/// adapters depend on the agent crate, never the other way around.
///
/// Edits to a given message must be issued sequentially by the caller; the
/// pipeline awaits every call before the next, so implementations need no
/// ordering logic of their own.
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Send a new message to the channel, returning its identifier.
    async fn post(&self, text: &str) -> Result<MessageRef, SinkError>;

    /// Replace the content of a previously posted message.
    async fn edit(&self, message: MessageRef, text: &str) -> Result<(), SinkError>;
}
