//! Error types for the pdf2mindmap library.
//!
//! Two error types exist:
//!
//! * [`MindmapError`]: every failure that stops a run. Each pipeline stage
//!   returns it as `Err(..)`; the orchestrator halts on the first one and
//!   never writes a partial artifact.
//!
//! * [`ChunkError`]: failures of the chunker alone. The chunker is usable
//!   on its own (no PDF, no provider), so it reports in its own vocabulary;
//!   the orchestrator lifts it into [`MindmapError::Chunking`].
//!
//! [`MindmapError::class`] maps each variant onto the coarse failure classes
//! a user sees (extraction, summarisation, diagram, render).

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2mindmap library.
#[derive(Debug, Error)]
pub enum MindmapError {
    // ── Input selection ───────────────────────────────────────────────────
    /// The user closed the selector without choosing a file.
    #[error("No input file was selected.")]
    InputSelectionCancelled,

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The document loaded but yielded no text at all.
    #[error("No text could be extracted from '{path}'\nScanned (image-only) PDFs are not supported.")]
    EmptyDocument { path: PathBuf },

    /// The extracted text could not be split into chunks.
    #[error("Chunking failed: {0}")]
    Chunking(#[from] ChunkError),

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium (or its directory), place the\n\
library next to the executable, or install it system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM call itself failed (network, auth, rate limit, …).
    #[error("Summarisation request failed: {message}")]
    SummarizationFailed { message: String },

    /// The provider answered, but with no content.
    #[error("The language model returned an empty response.")]
    EmptyResponse,

    // ── Diagram errors ────────────────────────────────────────────────────
    /// The response held no `start … end` block.
    #[error("No diagram block delimited by {start:?} … {end:?} was found in the model response.")]
    DiagramNotFound { start: String, end: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output HTML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The coarse failure class a [`MindmapError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    InputSelectionCancelled,
    Extraction,
    Summarization,
    DiagramNotFound,
    Render,
    Configuration,
    Internal,
}

impl MindmapError {
    /// Which pipeline stage this error terminates.
    pub fn class(&self) -> FailureClass {
        match self {
            MindmapError::InputSelectionCancelled => FailureClass::InputSelectionCancelled,
            MindmapError::FileNotFound { .. }
            | MindmapError::PermissionDenied { .. }
            | MindmapError::NotAPdf { .. }
            | MindmapError::CorruptPdf { .. }
            | MindmapError::PasswordRequired { .. }
            | MindmapError::WrongPassword { .. }
            | MindmapError::EmptyDocument { .. }
            | MindmapError::Chunking(_)
            | MindmapError::PdfiumBindingFailed(_) => FailureClass::Extraction,
            MindmapError::ProviderNotConfigured { .. }
            | MindmapError::SummarizationFailed { .. }
            | MindmapError::EmptyResponse => FailureClass::Summarization,
            MindmapError::DiagramNotFound { .. } => FailureClass::DiagramNotFound,
            MindmapError::OutputWriteFailed { .. } => FailureClass::Render,
            MindmapError::InvalidConfig(_) => FailureClass::Configuration,
            MindmapError::Internal(_) => FailureClass::Internal,
        }
    }
}

/// Errors raised by [`crate::pipeline::chunk::chunk`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// No pages, or only pages without text.
    #[error("Empty input: the document has no text to chunk")]
    EmptyInput,

    /// Chunk size / overlap / page limit out of range.
    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(String),

    /// The tokenizer could not be built or could not decode a window.
    #[error("Tokenization error: {0}")]
    Tokenization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagram_not_found_display() {
        let e = MindmapError::DiagramNotFound {
            start: "```mermaid".into(),
            end: "```".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("```mermaid"), "got: {msg}");
        assert_eq!(e.class(), FailureClass::DiagramNotFound);
    }

    #[test]
    fn chunk_error_lifts_into_extraction_class() {
        let e: MindmapError = ChunkError::EmptyInput.into();
        assert_eq!(e.class(), FailureClass::Extraction);
        assert!(e.to_string().contains("Empty input"));
    }

    #[test]
    fn summarization_errors_share_a_class() {
        assert_eq!(MindmapError::EmptyResponse.class(), FailureClass::Summarization);
        let e = MindmapError::SummarizationFailed {
            message: "HTTP 503".into(),
        };
        assert_eq!(e.class(), FailureClass::Summarization);
        assert!(e.to_string().contains("HTTP 503"));
    }

    #[test]
    fn output_write_failed_is_render_class() {
        let e = MindmapError::OutputWriteFailed {
            path: PathBuf::from("/nope/mindmap.html"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing dir"),
        };
        assert_eq!(e.class(), FailureClass::Render);
        assert!(e.to_string().contains("mindmap.html"));
    }
}
