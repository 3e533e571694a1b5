//! Pipeline stages for PDF-to-mindmap generation.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the model call can be replaced by a stub.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pages ──▶ chunk ──▶ summarize ──▶ diagram ──▶ render
//! (path)   (pdfium)  (tokens)   (LLM)        (extract)   (HTML)
//! ```
//!
//! 1. [`input`]: validate the path and the `%PDF` header
//! 2. [`pages`]: read page text; runs in `spawn_blocking` because
//!    pdfium is not async-safe. [`clean`] normalises each page.
//! 3. [`chunk`]: overlapping token windows measured by a [`tokenizer`]
//! 4. [`summarize`]: one chat request; the only stage with network I/O
//! 5. [`diagram`]: isolate the Mermaid block in the response
//! 6. [`render`]: embed the block in the HTML template and write it

pub mod chunk;
pub mod clean;
pub mod diagram;
pub mod input;
pub mod pages;
pub mod render;
pub mod summarize;
pub mod tokenizer;
