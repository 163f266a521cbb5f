//! Markdown-safe rendering of accumulated model output.
//!
//! Streamed replies are re-rendered from the raw buffer on every fragment, so
//! the escape-suppression state is recomputed from scratch each time rather
//! than carried incrementally. `render` is NOT idempotent: feeding it already
//! escaped text double-escapes. Callers must always pass raw accumulated
//! text.

/// Discord markdown characters escaped outside code spans.
const SPECIALS: &[char] = &['*', '_', '~', '|', '\\'];

/// Render raw accumulated text into displayable Discord markdown.
///
/// 1. Collapse runs of blank lines.
/// 2. Escape markdown specials outside backtick spans.
/// 3. Close any dangling code fence or backtick span, so every intermediate
///    render of a growing prefix is valid markdown.
pub fn render(raw: &str) -> String {
    let collapsed = collapse_newlines(raw);
    let escaped = escape_outside_code(&collapsed);
    close_dangling(escaped)
}

/// Collapse every run of two-or-more consecutive newlines into one.
fn collapse_newlines(text: &str) -> String {
    let mut out = text.to_string();
    while out.contains("\n\n") {
        out = out.replace("\n\n", "\n");
    }
    out
}

/// Escape markdown specials character-by-character, suppressing escapes
/// inside open backtick spans. Every backtick toggles the suppression state;
/// triple fences are not special-cased — three backticks toggle three times,
/// which leaves the state correct on both sides of a fence.
fn escape_outside_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut escaping = true;

    for ch in text.chars() {
        if ch == '`' {
            escaping = !escaping;
            out.push(ch);
            continue;
        }
        if escaping && SPECIALS.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Append a synthetic closing delimiter when the text ends inside an open
/// code fence or backtick span.
///
/// An odd number of ``` occurrences means an unterminated fence: append a
/// closing fence on its own line (plus a trailing newline when the text
/// already ends in one). Otherwise an odd single-backtick count gets one
/// closing backtick.
fn close_dangling(mut text: String) -> String {
    if text.matches("```").count() % 2 == 1 {
        if text.ends_with('\n') {
            text.push_str("\n```\n");
        } else {
            text.push_str("\n```");
        }
    } else if text.matches('`').count() % 2 == 1 {
        text.push('`');
    }
    text
}
