//! Streaming response aggregation.
//!
//! Fragments stream in, the raw buffer is re-rendered through the markdown
//! formatter on every arrival, and the outgoing Discord message is edited at
//! natural sentence boundaries. When the rendered text reaches the platform
//! size limit the current message is finalized and a fresh placeholder takes
//! over, so one logical reply can span several outgoing messages.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use banter_core::config::ChatConfig;
use banter_core::markdown;

use crate::provider::{ChatRequest, CompletionProvider, ProviderError};
use crate::stream::StreamEvent;

use super::sink::{ChatSink, MessageRef, SinkError};

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("unknown channel: {0}")]
    UnknownChannel(u64),
}

/// Drive one streaming completion into incrementally edited messages.
///
/// Posts the waiting placeholder, consumes the fragment stream strictly in
/// arrival order, and returns the full raw response. Fails on the first
/// provider or sink error; the caller decides what to do with the partial
/// output already on screen (history is never touched here).
pub async fn stream_reply(
    provider: Arc<dyn CompletionProvider>,
    sink: &dyn ChatSink,
    req: ChatRequest,
    chat: &ChatConfig,
) -> Result<String, TurnError> {
    let mut current = sink.post(&chat.waiting_message).await?;
    // Content last written into `current`; edits carrying identical text are
    // skipped so a delimiter flush followed by stream end costs one edit.
    let mut displayed: Option<String> = None;

    let (tx, mut rx) = mpsc::channel::<StreamEvent>(64);
    let producer = {
        let provider = Arc::clone(&provider);
        tokio::spawn(async move { provider.send_stream(&req, tx).await })
    };

    let mut buffer = String::new();
    let mut full = String::new();
    let mut failure: Option<ProviderError> = None;

    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::TextDelta { text } => {
                buffer.push_str(&text);
                full.push_str(&text);

                let rendered = markdown::render(&buffer);
                if !rendered.is_empty() && ends_with_delimiter(&rendered, &chat.delimiters) {
                    flush(sink, current, &rendered, &mut displayed).await?;
                }
                if rendered.chars().count() >= chat.max_response_length {
                    flush(sink, current, &rendered, &mut displayed).await?;
                    info!(chars = rendered.chars().count(), chunk = %rendered, "outgoing message full, rotating");
                    buffer.clear();
                    current = sink.post(&chat.waiting_message).await?;
                    displayed = None;
                }
            }
            StreamEvent::Error { message } => {
                failure = Some(ProviderError::Unavailable(message));
                break;
            }
            StreamEvent::Done {
                tokens_in,
                tokens_out,
                stop_reason,
                ..
            } => {
                debug!(tokens_in, tokens_out, %stop_reason, "stream complete");
                break;
            }
        }
    }
    drop(rx);

    // The producer may have failed before emitting anything (HTTP error,
    // timeout); surface that too.
    match producer.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            if failure.is_none() {
                failure = Some(e);
            }
        }
        Err(e) => {
            if failure.is_none() {
                failure = Some(ProviderError::Unavailable(e.to_string()));
            }
        }
    }

    if let Some(e) = failure {
        return Err(e.into());
    }

    let rendered = markdown::render(&buffer);
    if !rendered.is_empty() {
        flush(sink, current, &rendered, &mut displayed).await?;
    } else {
        sink.edit(current, &chat.empty_response_message).await?;
    }

    Ok(full)
}

async fn flush(
    sink: &dyn ChatSink,
    message: MessageRef,
    rendered: &str,
    displayed: &mut Option<String>,
) -> Result<(), SinkError> {
    if displayed.as_deref() == Some(rendered) {
        return Ok(());
    }
    sink.edit(message, rendered).await?;
    *displayed = Some(rendered.to_string());
    Ok(())
}

fn ends_with_delimiter(text: &str, delimiters: &str) -> bool {
    text.chars()
        .next_back()
        .map(|c| delimiters.contains(c))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{
        chat_config, RecordingSink, ScriptedProvider, SendOnlyProvider, SinkCall,
    };

    #[tokio::test]
    async fn empty_stream_shows_the_no_response_message() {
        let provider = Arc::new(ScriptedProvider::fragments(&[]));
        let sink = RecordingSink::default();
        let chat = chat_config();

        let reply = stream_reply(provider, &sink, ScriptedProvider::request(), &chat)
            .await
            .expect("turn should succeed");

        assert_eq!(reply, "");
        let calls = sink.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], SinkCall::Post { text, .. } if text == "…"));
        assert!(matches!(&calls[1], SinkCall::Edit { text, .. } if text == "(no response)"));
    }

    #[tokio::test]
    async fn delimiter_boundaries_drive_exactly_two_edits() {
        let provider = Arc::new(ScriptedProvider::fragments(&["Hel", "lo.", "World."]));
        let sink = RecordingSink::default();
        let chat = chat_config();

        let reply = stream_reply(provider, &sink, ScriptedProvider::request(), &chat)
            .await
            .expect("turn should succeed");

        assert_eq!(reply, "Hello.World.");
        let edits = sink.edits();
        assert_eq!(edits, vec!["Hello.".to_string(), "Hello.World.".to_string()]);
    }

    #[tokio::test]
    async fn reaching_max_length_rotates_the_outgoing_message() {
        let provider = Arc::new(ScriptedProvider::fragments(&["aaaa", "bbbb", "cc."]));
        let sink = RecordingSink::default();
        let mut chat = chat_config();
        chat.max_response_length = 6;

        let reply = stream_reply(provider, &sink, ScriptedProvider::request(), &chat)
            .await
            .expect("turn should succeed");

        assert_eq!(reply, "aaaabbbbcc.");
        let calls = sink.calls();
        // placeholder, finalize, fresh placeholder, flush into the new one
        assert_eq!(calls.len(), 4);
        let (first_id, second_id) = match (&calls[0], &calls[2]) {
            (SinkCall::Post { id: a, .. }, SinkCall::Post { id: b, .. }) => (*a, *b),
            other => panic!("expected two posts, got {other:?}"),
        };
        assert_ne!(first_id, second_id);
        assert!(
            matches!(&calls[1], SinkCall::Edit { id, text } if *id == first_id && text == "aaaabbbb")
        );
        assert!(matches!(&calls[3], SinkCall::Edit { id, text } if *id == second_id && text == "cc."));
    }

    #[tokio::test]
    async fn mid_stream_error_is_terminal() {
        let provider = Arc::new(ScriptedProvider::failing_after(&["Hi."], "boom"));
        let sink = RecordingSink::default();
        let chat = chat_config();

        let err = stream_reply(provider, &sink, ScriptedProvider::request(), &chat)
            .await
            .expect_err("turn should fail");

        assert!(matches!(err, TurnError::Provider(_)));
        // The flush before the failure stays on screen; no no-response edit.
        assert_eq!(sink.edits(), vec!["Hi.".to_string()]);
    }

    #[tokio::test]
    async fn non_streaming_provider_arrives_as_a_single_fragment() {
        let provider = Arc::new(SendOnlyProvider {
            content: "All at once.".to_string(),
        });
        let sink = RecordingSink::default();
        let chat = chat_config();

        let reply = stream_reply(provider, &sink, ScriptedProvider::request(), &chat)
            .await
            .expect("turn should succeed");

        assert_eq!(reply, "All at once.");
        assert_eq!(sink.edits(), vec!["All at once.".to_string()]);
    }

    #[tokio::test]
    async fn rendered_flushes_are_markdown_escaped() {
        let provider = Arc::new(ScriptedProvider::fragments(&["a*b*c."]));
        let sink = RecordingSink::default();
        let chat = chat_config();

        stream_reply(provider, &sink, ScriptedProvider::request(), &chat)
            .await
            .expect("turn should succeed");

        assert_eq!(sink.edits(), vec!["a\\*b\\*c.".to_string()]);
    }
}
