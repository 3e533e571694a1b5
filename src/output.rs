//! Result types returned by the generation entry points.

use crate::pipeline::diagram::DiagramPayload;
use crate::pipeline::render::RenderedDocument;
use serde::{Deserialize, Serialize};

/// Document-level metadata read from the PDF info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// Total pages in the document, not just the ones read.
    pub page_count: usize,
    /// e.g. "1.7". Empty when pdfium cannot tell.
    pub pdf_version: String,
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Pages in the document.
    pub total_pages: usize,
    /// Pages that went into chunking (at most `max_pages`).
    pub pages_used: usize,
    pub chunk_count: usize,
    /// Tokens in the joined page text, under the configured encoding.
    pub total_tokens: usize,
    /// Prompt tokens reported by the model provider.
    pub input_tokens: usize,
    /// Completion tokens reported by the model provider.
    pub output_tokens: usize,
    /// True when pages beyond `max_pages` were dropped.
    pub truncated: bool,
    pub extract_duration_ms: u64,
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a successful run produces.
#[derive(Debug, Clone)]
pub struct MindmapOutput {
    /// The finished HTML page.
    pub html: RenderedDocument,
    /// Diagram source embedded in `html`.
    pub diagram: DiagramPayload,
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialise_with_field_names() {
        let stats = RunStats {
            total_pages: 30,
            pages_used: 11,
            chunk_count: 4,
            truncated: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["pages_used"], 11);
        assert_eq!(json["truncated"], true);

        let back: RunStats = serde_json::from_value(json).unwrap();
        assert_eq!(back, stats);
    }
}
