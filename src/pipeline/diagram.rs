//! Diagram extraction: isolate the delimited block in a model response.
//!
//! The model is asked for a single fenced ```` ```mermaid ```` block but is
//! free to surround it with commentary, and sometimes emits stray fences.
//! The scan is deliberately minimal: first start marker, *last* end marker.
//! Anchoring on the rightmost end marker keeps a block intact even when the
//! model closes an inner fence early or appends a trailing one; the price is
//! that trailing noise between two closing fences is kept. The payload's
//! syntax is never checked.

use serde::Serialize;
use std::fmt;

/// Marker opening a Mermaid block.
pub const MERMAID_START: &str = "```mermaid";

/// Marker closing a fenced block.
pub const MERMAID_END: &str = "```";

/// Diagram source isolated from a model response, whitespace-trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiagramPayload(String);

impl DiagramPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for DiagramPayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiagramPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the text between the first `start` and the last `end` after it.
///
/// Returns `None` when either marker is missing, when no `end` occurs
/// strictly after the `start` marker, or when a marker is empty. No partial
/// recovery is attempted.
pub fn extract(response: &str, start: &str, end: &str) -> Option<DiagramPayload> {
    if start.is_empty() || end.is_empty() {
        return None;
    }

    let open = response.find(start)?;
    let close = response.rfind(end)?;
    let body_start = open + start.len();
    if close < body_start {
        return None;
    }

    Some(DiagramPayload(response[body_start..close].trim().to_string()))
}

/// [`extract`] with the Mermaid fence markers.
pub fn extract_mermaid(response: &str) -> Option<DiagramPayload> {
    extract(response, MERMAID_START, MERMAID_END)
}
