//! Decoder for single upstream event-stream lines
//!
//! The upstream sends `data: <json>` lines separated by blank lines and ends
//! the stream with `data: [DONE]`. Comment lines (`: OPENROUTER PROCESSING`)
//! and any other fields are ignored.

use super::types::ChatCompletionChunk;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// Longest payload excerpt carried by [`Frame::Malformed`]
pub const MALFORMED_EXCERPT_CHARS: usize = 100;

/// Outcome of decoding one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A non-empty piece of assistant text
    ContentDelta(String),
    /// The terminal sentinel; no further lines should be decoded
    Terminal,
    /// Blank lines, non-data lines and data without content
    Skip,
    /// A data payload that is not valid JSON (excerpt of the payload)
    Malformed(String),
}

/// Decode one line of upstream event-stream text
pub fn decode_line(line: &str) -> Frame {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Frame::Skip;
    }

    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Frame::Skip;
    };
    let payload = payload.strip_prefix(' ').unwrap_or(payload);

    if payload.trim() == DONE_SENTINEL {
        return Frame::Terminal;
    }

    match serde_json::from_str::<ChatCompletionChunk>(payload) {
        Ok(chunk) => chunk.content().map_or(Frame::Skip, Frame::ContentDelta),
        Err(_) => Frame::Malformed(excerpt(payload)),
    }
}

fn excerpt(payload: &str) -> String {
    match payload.char_indices().nth(MALFORMED_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &payload[..cut]),
        None => payload.to_string(),
    }
}
