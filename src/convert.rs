//! Generation entry points: PDF in, HTML flowchart out.
//!
//! Stages run strictly in sequence and the first failure ends the run:
//!
//! ```text
//! resolve ─▶ extract ─▶ chunk ─▶ summarize ─▶ diagram ─▶ render ─▶ (write)
//! ```
//!
//! [`generate_from_pages`] is the pure core. Every collaborator (summariser,
//! tokenizer) is passed in, so it runs without a PDF, a network, or a disk.
//! The other functions add file handling and provider resolution around it.

use crate::config::MindmapConfig;
use crate::error::{ChunkError, MindmapError};
use crate::output::{DocumentMetadata, MindmapOutput, RunStats};
use crate::pipeline::chunk::chunk;
use crate::pipeline::diagram::extract;
use crate::pipeline::input::resolve_input;
use crate::pipeline::pages::{extract_metadata, load_pages, Page};
use crate::pipeline::render::{render, write_document};
use crate::pipeline::summarize::{LlmSummarizer, Summarizer};
use crate::pipeline::tokenizer::{TiktokenTokenizer, Tokenizer};
use crate::progress::{ProgressCallback, Stage};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Generate a flowchart page from a PDF file.
///
/// The LLM provider is resolved from `config` and the environment (see
/// [`crate::pipeline::summarize::resolve_provider`]). Nothing is written to
/// disk; use [`generate_to_file`] for that.
///
/// # Errors
/// Returns the first failure of any stage. No partial output is produced.
pub async fn generate(
    input: impl AsRef<Path>,
    config: &MindmapConfig,
) -> Result<MindmapOutput, MindmapError> {
    let summarizer = LlmSummarizer::from_config(config)?;
    generate_with(input, &summarizer, config).await
}

/// [`generate`] with an explicit summariser.
pub async fn generate_with(
    input: impl AsRef<Path>,
    summarizer: &dyn Summarizer,
    config: &MindmapConfig,
) -> Result<MindmapOutput, MindmapError> {
    let total_start = Instant::now();
    let progress = Progress(config.progress_callback.as_ref());

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let pdf_path = resolve_input(input)?;
    info!("Generating mindmap for {}", pdf_path.display());

    // ── Step 2: Extract page text ────────────────────────────────────────
    progress.start(Stage::Extract);
    let extract_start = Instant::now();
    let pages = load_pages(&pdf_path, config.password.as_deref()).await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    progress.complete(Stage::Extract, &format!("{} pages", pages.len()));
    info!("Extracted {} pages in {}ms", pages.len(), extract_duration_ms);

    // ── Steps 3-6: Chunk, summarise, extract diagram, render ─────────────
    let tokenizer = TiktokenTokenizer::new(config.encoding)?;
    let mut output = generate_from_pages(&pages, summarizer, &tokenizer, config)
        .await
        .map_err(|e| match e {
            MindmapError::Chunking(ChunkError::EmptyInput) => MindmapError::EmptyDocument {
                path: pdf_path.clone(),
            },
            other => other,
        })?;

    output.stats.extract_duration_ms = extract_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Mindmap ready: {} chunks, {}ms total",
        output.stats.chunk_count, output.stats.total_duration_ms
    );
    Ok(output)
}

/// Run chunking, summarisation, diagram extraction and rendering over
/// already-extracted pages.
///
/// # Errors
/// - [`MindmapError::Chunking`] with [`ChunkError::EmptyInput`] when the
///   pages hold no text; the summariser is not called
/// - whatever the summariser returns
/// - [`MindmapError::DiagramNotFound`] when the response has no delimited block
pub async fn generate_from_pages(
    pages: &[Page],
    summarizer: &dyn Summarizer,
    tokenizer: &dyn Tokenizer,
    config: &MindmapConfig,
) -> Result<MindmapOutput, MindmapError> {
    let total_start = Instant::now();
    let progress = Progress(config.progress_callback.as_ref());

    // ── Chunk ────────────────────────────────────────────────────────────
    progress.start(Stage::Chunk);
    let chunked = chunk(
        pages,
        config.max_pages,
        config.chunk_size,
        config.chunk_overlap,
        tokenizer,
    )?;
    if let Some(t) = chunked.truncation {
        progress.warn(&format!(
            "Only the first {} of {} pages are used",
            t.kept, t.total
        ));
    }
    progress.complete(Stage::Chunk, &format!("{} chunks", chunked.chunks.len()));

    // ── Summarize ────────────────────────────────────────────────────────
    progress.start(Stage::Summarize);
    let llm_start = Instant::now();
    let response = summarizer.summarize(&chunked.chunks).await?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    progress.complete(
        Stage::Summarize,
        &format!("{} chars in {}ms", response.content.len(), llm_duration_ms),
    );
    debug!("Model response:\n{}", response.content);

    // ── Diagram ──────────────────────────────────────────────────────────
    progress.start(Stage::Diagram);
    let diagram = extract(
        &response.content,
        &config.start_delimiter,
        &config.end_delimiter,
    )
    .ok_or_else(|| MindmapError::DiagramNotFound {
        start: config.start_delimiter.clone(),
        end: config.end_delimiter.clone(),
    })?;
    progress.complete(Stage::Diagram, &format!("{} chars", diagram.as_str().len()));

    // ── Render ───────────────────────────────────────────────────────────
    progress.start(Stage::Render);
    let html = render(&diagram, &config.template);
    progress.complete(Stage::Render, &format!("{} bytes", html.as_str().len()));

    let stats = RunStats {
        total_pages: pages.len(),
        pages_used: chunked.pages_used,
        chunk_count: chunked.chunks.len(),
        total_tokens: chunked.total_tokens,
        input_tokens: response.input_tokens,
        output_tokens: response.output_tokens,
        truncated: chunked.truncation.is_some(),
        extract_duration_ms: 0,
        llm_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    Ok(MindmapOutput {
        html,
        diagram,
        stats,
    })
}

/// Generate a flowchart page and write it to `output_path`.
///
/// The write is atomic; on any failure no file is created or replaced.
pub async fn generate_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &MindmapConfig,
) -> Result<RunStats, MindmapError> {
    let summarizer = LlmSummarizer::from_config(config)?;
    let output = generate_to_file_with(input, output_path, &summarizer, config).await?;
    Ok(output.stats)
}

/// [`generate_to_file`] with an explicit summariser, returning the full output.
pub async fn generate_to_file_with(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    summarizer: &dyn Summarizer,
    config: &MindmapConfig,
) -> Result<MindmapOutput, MindmapError> {
    let mut output = generate_with(input, summarizer, config).await?;
    let path = output_path.as_ref();

    let progress = Progress(config.progress_callback.as_ref());
    progress.start(Stage::Write);
    let write_start = Instant::now();
    write_document(&output.html, path)?;
    output.stats.total_duration_ms += write_start.elapsed().as_millis() as u64;
    progress.complete(Stage::Write, &path.display().to_string());

    Ok(output)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    input: impl AsRef<Path>,
    config: &MindmapConfig,
) -> Result<MindmapOutput, MindmapError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MindmapError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(input, config))
}

/// Read PDF metadata without extracting text or calling a model.
///
/// Does not require an LLM provider or API key.
pub async fn inspect(
    input: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, MindmapError> {
    let pdf_path = resolve_input(input)?;
    extract_metadata(&pdf_path, password).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

struct Progress<'a>(Option<&'a ProgressCallback>);

impl Progress<'_> {
    fn start(&self, stage: Stage) {
        if let Some(cb) = self.0 {
            cb.on_stage_start(stage);
        }
    }

    fn complete(&self, stage: Stage, detail: &str) {
        if let Some(cb) = self.0 {
            cb.on_stage_complete(stage, detail);
        }
    }

    fn warn(&self, message: &str) {
        if let Some(cb) = self.0 {
            cb.on_warning(message);
        }
    }
}
