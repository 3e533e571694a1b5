//! Configuration types for PDF-to-mindmap generation.
//!
//! Every knob lives in [`MindmapConfig`], built via [`MindmapConfigBuilder`].
//! Defaults reproduce the behaviour of the command-line tool: eleven pages,
//! 1000-token chunks with 100 tokens of overlap under `p50k_base`, and a
//! single `gpt-4o-mini` request at temperature 0.5.

use crate::error::MindmapError;
use crate::pipeline::chunk::MIN_CHUNK_SIZE;
use crate::pipeline::diagram::{MERMAID_END, MERMAID_START};
use crate::pipeline::render::Template;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default model when neither the caller nor the environment picks one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for a PDF-to-mindmap run.
///
/// # Example
/// ```rust
/// use pdf2mindmap::{MindmapConfig, TokenEncoding};
///
/// let config = MindmapConfig::builder()
///     .max_pages(20)
///     .chunk_size(800)
///     .chunk_overlap(80)
///     .encoding(TokenEncoding::Cl100kBase)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_pages, 20);
/// ```
#[derive(Clone)]
pub struct MindmapConfig {
    /// Only the first `max_pages` pages are read. Default: 11.
    ///
    /// Keeps the prompt inside the model's context window and the cost of a
    /// single request predictable. Longer documents are truncated with a
    /// warning, not rejected.
    pub max_pages: usize,

    /// Maximum chunk length in tokens, at least [`MIN_CHUNK_SIZE`]. Default: 1000.
    pub chunk_size: usize,

    /// Tokens shared by adjacent chunks. Must be smaller than `chunk_size`. Default: 100.
    pub chunk_overlap: usize,

    /// Token-counting scheme used for chunk sizes. Default: [`TokenEncoding::P50kBase`].
    pub encoding: TokenEncoding,

    /// LLM model identifier. If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.5.
    ///
    /// Mid-range: low enough to stay faithful to the text, high enough for
    /// the model to choose its own grouping of topics.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 1500.
    pub max_tokens: usize,

    /// Custom system prompt. If None, uses [`crate::prompts::DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Marker opening the diagram block. Default: "```mermaid".
    pub start_delimiter: String,

    /// Marker closing the diagram block (rightmost match wins). Default: "```".
    pub end_delimiter: String,

    /// HTML page the diagram is embedded into. Default: [`Template::default`].
    pub template: Template,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Optional per-stage progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for MindmapConfig {
    fn default() -> Self {
        Self {
            max_pages: 11,
            chunk_size: 1000,
            chunk_overlap: 100,
            encoding: TokenEncoding::default(),
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.5,
            max_tokens: 1500,
            system_prompt: None,
            start_delimiter: MERMAID_START.to_string(),
            end_delimiter: MERMAID_END.to_string(),
            template: Template::default(),
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for MindmapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MindmapConfig")
            .field("max_pages", &self.max_pages)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("encoding", &self.encoding)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("start_delimiter", &self.start_delimiter)
            .field("end_delimiter", &self.end_delimiter)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl MindmapConfig {
    /// Create a new builder for `MindmapConfig`.
    pub fn builder() -> MindmapConfigBuilder {
        MindmapConfigBuilder {
            config: Self::default(),
        }
    }

    /// The model that will be requested.
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`MindmapConfig`].
#[derive(Debug)]
pub struct MindmapConfigBuilder {
    config: MindmapConfig,
}

impl MindmapConfigBuilder {
    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = n.max(1);
        self
    }

    pub fn chunk_size(mut self, tokens: usize) -> Self {
        self.config.chunk_size = tokens;
        self
    }

    pub fn chunk_overlap(mut self, tokens: usize) -> Self {
        self.config.chunk_overlap = tokens;
        self
    }

    pub fn encoding(mut self, encoding: TokenEncoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn delimiters(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.config.start_delimiter = start.into();
        self.config.end_delimiter = end.into();
        self
    }

    pub fn template(mut self, template: Template) -> Self {
        self.config.template = template;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<MindmapConfig, MindmapError> {
        let c = &self.config;
        if c.chunk_size < MIN_CHUNK_SIZE {
            return Err(MindmapError::InvalidConfig(format!(
                "Chunk size must be ≥ {} tokens (got {})",
                MIN_CHUNK_SIZE, c.chunk_size
            )));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(MindmapError::InvalidConfig(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.max_tokens == 0 {
            return Err(MindmapError::InvalidConfig(
                "Max tokens must be ≥ 1".into(),
            ));
        }
        if c.start_delimiter.is_empty() || c.end_delimiter.is_empty() {
            return Err(MindmapError::InvalidConfig(
                "Diagram delimiters must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Byte-pair encoding used to measure chunk sizes.
///
/// `p50k_base` is the default because chunk sizes were tuned against it;
/// `cl100k_base` or `o200k_base` match current OpenAI chat models more
/// closely and can be selected when exact budgeting matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TokenEncoding {
    /// GPT-3 (davinci) encoding.
    R50kBase,
    /// Codex / text-davinci-002/003 encoding. (default)
    #[default]
    P50kBase,
    /// Edit-model variant of `p50k_base`.
    P50kEdit,
    /// GPT-3.5 / GPT-4 encoding.
    Cl100kBase,
    /// GPT-4o family encoding.
    O200kBase,
}

impl TokenEncoding {
    /// The tiktoken name of this encoding.
    pub fn name(&self) -> &'static str {
        match self {
            TokenEncoding::R50kBase => "r50k_base",
            TokenEncoding::P50kBase => "p50k_base",
            TokenEncoding::P50kEdit => "p50k_edit",
            TokenEncoding::Cl100kBase => "cl100k_base",
            TokenEncoding::O200kBase => "o200k_base",
        }
    }
}

impl fmt::Display for TokenEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
