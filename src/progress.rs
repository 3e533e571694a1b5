//! Progress-callback trait for per-stage pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::MindmapConfigBuilder::progress_callback`] to be told when
//! each stage starts and finishes. The CLI drives its spinner from these
//! events; library callers can forward them anywhere.
//!
//! # Example
//!
//! ```rust
//! use pdf2mindmap::{MindmapConfig, PipelineProgressCallback, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     finished: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for CountingCallback {
//!     fn on_stage_complete(&self, stage: Stage, detail: &str) {
//!         self.finished.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{stage} done: {detail}");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { finished: AtomicUsize::new(0) });
//!
//! let config = MindmapConfig::builder()
//!     .progress_callback(counter as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// Pipeline stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Read page text from the PDF.
    Extract,
    /// Split page text into overlapping token windows.
    Chunk,
    /// The model request.
    Summarize,
    /// Isolate the diagram block in the response.
    Diagram,
    /// Embed the diagram into the HTML page.
    Render,
    /// Persist the page to disk.
    Write,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Chunk => "chunk",
            Stage::Summarize => "summarize",
            Stage::Diagram => "diagram",
            Stage::Render => "render",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the pipeline as it moves through its stages.
///
/// Stages run strictly one after another, so calls never overlap. All
/// methods have default no-op implementations so callers only override what
/// they care about.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called just before `stage` begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when `stage` succeeds.
    ///
    /// # Arguments
    /// * `stage`: the stage that finished
    /// * `detail`: short human-readable summary, e.g. "3 chunks"
    fn on_stage_complete(&self, stage: Stage, detail: &str) {
        let _ = (stage, detail);
    }

    /// Called for non-fatal conditions, such as pages dropped by truncation.
    fn on_warning(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::MindmapConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
