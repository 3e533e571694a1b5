//! # pdf2mindmap
//!
//! Summarise a PDF document as a Mermaid flowchart and render it to a
//! standalone HTML page.
//!
//! The text layer of the first pages is extracted, split into overlapping
//! token windows, and handed to a language model with instructions to answer
//! with a single ```` ```mermaid ```` block. That block is cut out of the
//! free-form answer and embedded into an HTML page that renders it in the
//! browser.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     validate path and %PDF header
//!  ├─ 2. Extract   page text via pdfium (spawn_blocking) + cleanup
//!  ├─ 3. Chunk     overlapping windows of N tokens (tiktoken)
//!  ├─ 4. Summarize one chat request to gpt-4o-mini / claude / gemini / …
//!  ├─ 5. Diagram   first ```mermaid … last ``` in the answer
//!  └─ 6. Render    diagram embedded in the HTML template
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2mindmap::{generate_to_file, MindmapConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = MindmapConfig::default();
//!     let stats = generate_to_file("document.pdf", "mindmap.html", &config).await?;
//!     eprintln!("{} chunks, {} tokens in / {} out",
//!         stats.chunk_count, stats.input_tokens, stats.output_tokens);
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without a model
//!
//! [`generate_from_pages`] takes the summariser and tokenizer as trait
//! objects, so the whole pipeline after extraction can run against stubs.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2mindmap` binary (clap + anyhow + indicatif + tracing-subscriber + dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod host;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod template;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{MindmapConfig, MindmapConfigBuilder, TokenEncoding};
pub use convert::{
    generate, generate_from_pages, generate_sync, generate_to_file, generate_to_file_with,
    generate_with, inspect,
};
pub use error::{ChunkError, FailureClass, MindmapError};
pub use host::{
    select_input, ArgumentSelector, InputSelector, NoopViewer, PromptSelector, SystemViewer, Viewer,
};
pub use output::{DocumentMetadata, MindmapOutput, RunStats};
pub use pipeline::chunk::{chunk, ChunkSequence, Chunked, TextChunk, Truncation, MIN_CHUNK_SIZE};
pub use pipeline::diagram::{extract, extract_mermaid, DiagramPayload};
pub use pipeline::pages::Page;
pub use pipeline::render::{render, write_document, RenderedDocument, Template};
pub use pipeline::summarize::{resolve_provider, LlmSummarizer, SummaryResponse, Summarizer};
pub use pipeline::tokenizer::{TiktokenTokenizer, Tokenizer};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
