//! CLI binary for pdf2mindmap.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `MindmapConfig`, picks the input file, and opens the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2mindmap::{
    generate_to_file_with, inspect, select_input, ArgumentSelector, LlmSummarizer, MindmapConfig,
    MindmapError, NoopViewer, PipelineProgressCallback, ProgressCallback, PromptSelector, Stage,
    SystemViewer, Template, TokenEncoding, Viewer,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one spinner naming the running stage, plus a
/// log line per finished stage printed above it.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn stage_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Extract => "Reading page text…",
        Stage::Chunk => "Splitting into chunks…",
        Stage::Summarize => "Waiting for the language model…",
        Stage::Diagram => "Extracting the diagram…",
        Stage::Render => "Rendering HTML…",
        Stage::Write => "Writing output…",
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.label());
        self.bar.set_message(stage_message(stage));
    }

    fn on_stage_complete(&self, stage: Stage, detail: &str) {
        self.bar.println(format!(
            "  {} {:<10} {}",
            green("✓"),
            stage.label(),
            dim(detail)
        ));
    }

    fn on_warning(&self, message: &str) {
        self.bar.println(format!("  {} {}", yellow("⚠"), message));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Pick a file interactively, write mindmap.html and open it
  pdf2mindmap

  # Non-interactive
  pdf2mindmap report.pdf -o report.html

  # Read more pages, larger chunks
  pdf2mindmap --pages 20 --chunk-size 1500 --chunk-overlap 150 paper.pdf

  # Use a specific model
  pdf2mindmap --provider anthropic --model claude-sonnet-4-20250514 paper.pdf

  # Inspect PDF metadata (no API key needed)
  pdf2mindmap --inspect-only document.pdf

  # Machine-readable run statistics, no browser
  pdf2mindmap --json --no-open document.pdf > stats.json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)

  Variables may also be placed in a .env file in the working directory.

SETUP:
  1. Set API key:     export OPENAI_API_KEY=sk-...
  2. Generate:        pdf2mindmap document.pdf
"#;

/// Summarise a PDF as a Mermaid flowchart and open it in the browser.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2mindmap",
    version,
    about = "Summarise a PDF as a Mermaid flowchart HTML page using an LLM",
    long_about = "Extract the text of the first pages of a PDF, ask a language model to \
summarise it as a Mermaid `graph LR` flowchart, and write a standalone HTML page that \
renders it. Supports OpenAI, Anthropic, Google Gemini, Azure OpenAI, and any \
OpenAI-compatible endpoint (Ollama, vLLM, LiteLLM, etc.).",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file. Prompted for on the terminal when omitted.
    input: Option<PathBuf>,

    /// Number of leading pages to read.
    #[arg(short, long, env = "PDF2MINDMAP_PAGES", default_value_t = 11,
          value_parser = clap::value_parser!(u64).range(1..))]
    pages: u64,

    /// Output HTML file.
    #[arg(short, long, env = "PDF2MINDMAP_OUTPUT", default_value = "mindmap.html")]
    output: PathBuf,

    /// Chunk size in tokens.
    #[arg(long, env = "PDF2MINDMAP_CHUNK_SIZE", default_value_t = 1000)]
    chunk_size: usize,

    /// Tokens shared by adjacent chunks.
    #[arg(long, env = "PDF2MINDMAP_CHUNK_OVERLAP", default_value_t = 100)]
    chunk_overlap: usize,

    /// Token encoding used to measure chunks.
    #[arg(long, env = "PDF2MINDMAP_ENCODING", value_enum, default_value = "p50k-base")]
    encoding: EncodingArg,

    /// LLM model ID (e.g. gpt-4o-mini, gpt-4.1, claude-sonnet-4-20250514).
    #[arg(long, env = "PDF2MINDMAP_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "PDF2MINDMAP_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDF2MINDMAP_TEMPERATURE", default_value_t = 0.5)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "PDF2MINDMAP_MAX_TOKENS", default_value_t = 1500)]
    max_tokens: usize,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "PDF2MINDMAP_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Path to an HTML template containing `{{ diagram }}` exactly once.
    #[arg(long, env = "PDF2MINDMAP_TEMPLATE")]
    template: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2MINDMAP_PASSWORD")]
    password: Option<String>,

    /// Do not open the result in the default viewer.
    #[arg(long, env = "PDF2MINDMAP_NO_OPEN")]
    no_open: bool,

    /// Print run statistics (or metadata with --inspect-only) as JSON on stdout.
    #[arg(long, env = "PDF2MINDMAP_JSON")]
    json: bool,

    /// Print PDF metadata only, no summarisation.
    #[arg(long)]
    inspect_only: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDF2MINDMAP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2MINDMAP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2MINDMAP_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EncodingArg {
    R50kBase,
    P50kBase,
    P50kEdit,
    Cl100kBase,
    O200kBase,
}

impl From<EncodingArg> for TokenEncoding {
    fn from(v: EncodingArg) -> Self {
        match v {
            EncodingArg::R50kBase => TokenEncoding::R50kBase,
            EncodingArg::P50kBase => TokenEncoding::P50kBase,
            EncodingArg::P50kEdit => TokenEncoding::P50kEdit,
            EncodingArg::Cl100kBase => TokenEncoding::Cl100kBase,
            EncodingArg::O200kBase => TokenEncoding::O200kBase,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Loaded before parsing so `.env` values also feed clap's `env` fallbacks.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active;
    // the spinner provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let Some(input) = pick_input(&cli)? else {
            return Ok(());
        };
        let meta = inspect(&input, cli.password.as_deref())
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build config and provider ────────────────────────────────────────
    // The provider is resolved before asking for a file so a missing API
    // key fails immediately.
    let mut config = build_config(&cli).await?;
    let summarizer = LlmSummarizer::from_config(&config).context("No language model available")?;

    // ── Select input ─────────────────────────────────────────────────────
    let Some(input) = pick_input(&cli)? else {
        return Ok(());
    };

    let spinner = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };
    config.progress_callback = spinner
        .as_ref()
        .map(|cb| Arc::clone(cb) as ProgressCallback);

    // ── Run pipeline ─────────────────────────────────────────────────────
    let result = generate_to_file_with(&input, &cli.output, &summarizer, &config).await;
    if let Some(ref cb) = spinner {
        cb.finish();
    }
    let output = result.context("Mindmap generation failed")?;
    let stats = &output.stats;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(stats).context("Failed to serialise statistics")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {}/{} pages  {} chunks  {}ms  →  {}",
            if stats.truncated { cyan("⚠") } else { green("✔") },
            stats.pages_used,
            stats.total_pages,
            stats.chunk_count,
            stats.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&stats.input_tokens.to_string()),
            dim(&stats.output_tokens.to_string()),
        );
    }

    // ── Show result ──────────────────────────────────────────────────────
    open_in_viewer(viewer_for(&cli), &cli.output);

    Ok(())
}

/// The positional argument if given, otherwise a terminal prompt.
///
/// A cancelled choice is reported and yields `None`; the run then ends
/// without an error status.
fn pick_input(cli: &Cli) -> Result<Option<PathBuf>> {
    let picked = match cli.input {
        Some(ref path) => select_input(&mut ArgumentSelector::new(path.clone())),
        None => select_input(&mut PromptSelector::stdio()),
    };
    match picked {
        Ok(path) => Ok(Some(path)),
        Err(e @ MindmapError::InputSelectionCancelled) => {
            eprintln!("{}", yellow(&e.to_string()));
            Ok(None)
        }
        Err(e) => Err(e).context("Failed to select the input file"),
    }
}

fn viewer_for(cli: &Cli) -> &'static dyn Viewer {
    if cli.no_open {
        &NoopViewer
    } else {
        &SystemViewer
    }
}

fn open_in_viewer(viewer: &dyn Viewer, path: &Path) {
    if let Err(e) = viewer.open(path) {
        warn!("Could not open {} in a viewer: {}", path.display(), e);
    }
}

/// Map CLI args to `MindmapConfig`.
async fn build_config(cli: &Cli) -> Result<MindmapConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let template = if let Some(ref path) = cli.template {
        let source = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read template from {:?}", path))?;
        Some(Template::new(&source).with_context(|| format!("Unusable template {:?}", path))?)
    } else {
        None
    };

    let mut builder = MindmapConfig::builder()
        .max_pages(cli.pages as usize)
        .chunk_size(cli.chunk_size)
        .chunk_overlap(cli.chunk_overlap)
        .encoding(cli.encoding.into())
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }
    if let Some(template) = template {
        builder = builder.template(template);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_library_defaults() {
        let cli = Cli::try_parse_from(["pdf2mindmap", "doc.pdf"]).unwrap();
        assert_eq!(cli.pages, 11);
        assert_eq!(cli.output, PathBuf::from("mindmap.html"));
        assert_eq!(cli.chunk_size, 1000);
        assert_eq!(cli.chunk_overlap, 100);
        assert!(matches!(cli.encoding, EncodingArg::P50kBase));
    }

    #[test]
    fn zero_pages_rejected() {
        assert!(Cli::try_parse_from(["pdf2mindmap", "-p", "0", "doc.pdf"]).is_err());
    }

    #[test]
    fn encoding_accepts_kebab_case() {
        let cli = Cli::try_parse_from(["pdf2mindmap", "--encoding", "cl100k-base"]).unwrap();
        assert_eq!(TokenEncoding::from(cli.encoding), TokenEncoding::Cl100kBase);
        assert!(cli.input.is_none());
    }

    struct FailingViewer;

    impl Viewer for FailingViewer {
        fn open(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::other("no display"))
        }
    }

    #[test]
    fn positional_path_is_picked_without_prompting() {
        let cli = Cli::try_parse_from(["pdf2mindmap", "doc.pdf"]).unwrap();
        assert_eq!(pick_input(&cli).unwrap(), Some(PathBuf::from("doc.pdf")));
    }

    #[test]
    fn no_open_uses_noop_viewer() {
        let cli = Cli::try_parse_from(["pdf2mindmap", "--no-open", "doc.pdf"]).unwrap();
        assert!(viewer_for(&cli).open(Path::new("does/not/exist.html")).is_ok());
    }

    #[test]
    fn viewer_failure_is_not_fatal() {
        open_in_viewer(&FailingViewer, Path::new("mindmap.html"));
    }
}
