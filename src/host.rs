//! Host capabilities: choosing the input file and showing the result.
//!
//! Both sit behind small traits so the pipeline and the CLI can be driven
//! without a terminal or a desktop session.

use crate::error::MindmapError;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

// ── Input selection ──────────────────────────────────────────────────────

/// Source of the PDF to process.
pub trait InputSelector {
    /// Returns `Ok(None)` when the user declines to pick a file.
    fn select_file(&mut self) -> io::Result<Option<PathBuf>>;
}

/// Non-interactive selection from a path given up front.
#[derive(Debug, Clone)]
pub struct ArgumentSelector {
    path: Option<PathBuf>,
}

impl ArgumentSelector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

impl InputSelector for ArgumentSelector {
    fn select_file(&mut self) -> io::Result<Option<PathBuf>> {
        Ok(self.path.take())
    }
}

/// Asks for a path on a terminal.
///
/// An empty answer, `q`, or end of input cancels. Surrounding quotes are
/// stripped so paths dropped onto a terminal window work as-is.
pub struct PromptSelector<R, W> {
    reader: R,
    writer: W,
}

impl PromptSelector<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr, read from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> PromptSelector<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}
impl<R: BufRead, W: Write> InputSelector for PromptSelector<R, W> {
    fn select_file(&mut self) -> io::Result<Option<PathBuf>> {
        write!(self.writer, "PDF file to summarise (empty to cancel): ")?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let answer = line
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim();
        if answer.is_empty() || answer.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        Ok(Some(PathBuf::from(answer)))
    }
}

/// Ask `selector` for a file, treating a declined choice as an error.
///
/// # Errors
/// - [`MindmapError::InputSelectionCancelled`] when no file was chosen
/// - [`MindmapError::Internal`] when the selector itself failed to read
pub fn select_input(selector: &mut dyn InputSelector) -> Result<PathBuf, MindmapError> {
    match selector.select_file() {
        Ok(Some(path)) => Ok(path),
        Ok(None) => Err(MindmapError::InputSelectionCancelled),
        Err(e) => Err(MindmapError::Internal(format!(
            "failed to read the input file name: {e}"
        ))),
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// Shows a finished page to the user.
pub trait Viewer {
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// Opens files with the platform's default application.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemViewer;

impl SystemViewer {
    fn command(path: &Path) -> Command {
        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            // The empty string is the window title `start` expects first.
            cmd.args(["/C", "start", ""]).arg(path);
            cmd
        }
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(path);
            cmd
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        }
    }
}

impl Viewer for SystemViewer {
    fn open(&self, path: &Path) -> io::Result<()> {
        let mut cmd = Self::command(path);
        debug!("Launching viewer: {:?}", cmd);
        let status = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if !status.success() {
            return Err(io::Error::other(format!("viewer exited with {status}")));
        }
        Ok(())
    }
}

/// Does nothing. Used for `--no-open` and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopViewer;

impl Viewer for NoopViewer {
    fn open(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureClass;

    fn prompt(input: &str) -> (Option<PathBuf>, String) {
        let mut out = Vec::new();
        let picked = PromptSelector::new(input.as_bytes(), &mut out)
            .select_file()
            .unwrap();
        (picked, String::from_utf8(out).unwrap())
    }

    #[test]
    fn argument_selector_yields_once() {
        let mut s = ArgumentSelector::new("doc.pdf");
        assert_eq!(s.select_file().unwrap(), Some(PathBuf::from("doc.pdf")));
        assert_eq!(s.select_file().unwrap(), None);
    }

    #[test]
    fn prompt_reads_path() {
        let (picked, shown) = prompt("  /tmp/report.pdf \n");
        assert_eq!(picked, Some(PathBuf::from("/tmp/report.pdf")));
        assert!(shown.contains("PDF file"));
    }

    #[test]
    fn prompt_strips_quotes() {
        let (picked, _) = prompt("'/tmp/my report.pdf'\n");
        assert_eq!(picked, Some(PathBuf::from("/tmp/my report.pdf")));
    }

    #[test]
    fn prompt_cancel_variants() {
        assert_eq!(prompt("\n").0, None);
        assert_eq!(prompt("q\n").0, None);
        assert_eq!(prompt("").0, None);
    }

    #[test]
    fn cancelled_prompt_is_selection_cancelled() {
        let mut out = Vec::new();
        let mut selector = PromptSelector::new("\n".as_bytes(), &mut out);
        let err = select_input(&mut selector).unwrap_err();
        assert!(matches!(err, MindmapError::InputSelectionCancelled));
        assert_eq!(err.class(), FailureClass::InputSelectionCancelled);
    }

    #[test]
    fn select_input_passes_chosen_path_through() {
        let mut selector = ArgumentSelector::new("doc.pdf");
        assert_eq!(select_input(&mut selector).unwrap(), PathBuf::from("doc.pdf"));
        assert!(matches!(
            select_input(&mut selector),
            Err(MindmapError::InputSelectionCancelled)
        ));
    }

    #[test]
    fn noop_viewer_succeeds() {
        assert!(NoopViewer.open(Path::new("missing.html")).is_ok());
    }
}
