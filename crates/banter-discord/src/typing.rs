//! Typing indicator refresher.
//!
//! Discord's typing indicator expires after roughly ten seconds, so it is
//! re-broadcast every 8 s while a turn is in flight. `stop()` aborts the loop
//! immediately.

use std::sync::Arc;
use std::time::Duration;

use serenity::http::Http;
use serenity::model::id::ChannelId;

/// Handle to a background typing indicator task.
pub struct TypingHandle(tokio::task::JoinHandle<()>);

impl TypingHandle {
    /// Broadcast typing immediately, then every 8 seconds.
    pub fn start(http: Arc<Http>, channel_id: ChannelId) -> Self {
        let handle = tokio::spawn(async move {
            loop {
                let _ = channel_id.broadcast_typing(&http).await;
                tokio::time::sleep(Duration::from_secs(8)).await;
            }
        });
        TypingHandle(handle)
    }

    /// Abort the typing indicator loop.
    pub fn stop(self) {
        self.0.abort();
    }
}
