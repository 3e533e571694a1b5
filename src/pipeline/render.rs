//! Page rendering: embed a diagram payload into an HTML template.
//!
//! Rendering is plain substitution into the template's single
//! [`DIAGRAM_SLOT`]; Mermaid itself runs in the viewer's browser, loaded from
//! the pinned CDN URL inside the template.
//!
//! ## Unescaped payload
//!
//! The payload is inserted verbatim. Mermaid reads the raw text content of
//! the `.mermaid` element, so HTML-escaping would change what it parses. The
//! consequence is that a hostile model response could inject markup into the
//! page; the payload is treated as trusted diagram source.

use crate::error::MindmapError;
use crate::pipeline::diagram::DiagramPayload;
use crate::template::DEFAULT_TEMPLATE;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Placeholder replaced by the diagram payload.
pub const DIAGRAM_SLOT: &str = "{{ diagram }}";

/// An HTML template with exactly one [`DIAGRAM_SLOT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    before: String,
    after: String,
}

impl Template {
    /// Parse a template, checking it holds the slot exactly once.
    pub fn new(source: &str) -> Result<Self, MindmapError> {
        match source.matches(DIAGRAM_SLOT).count() {
            1 => {}
            0 => {
                return Err(MindmapError::InvalidConfig(format!(
                    "template has no {DIAGRAM_SLOT} slot"
                )))
            }
            n => {
                return Err(MindmapError::InvalidConfig(format!(
                    "template has {n} {DIAGRAM_SLOT} slots; exactly one is allowed"
                )))
            }
        }
        let (before, after) = source
            .split_once(DIAGRAM_SLOT)
            .ok_or_else(|| MindmapError::Internal("slot vanished after counting".into()))?;

        Ok(Self {
            before: before.to_string(),
            after: after.to_string(),
        })
    }

    /// Substitute `payload` into the slot.
    pub fn render(&self, payload: &DiagramPayload) -> RenderedDocument {
        let body = payload.as_str();
        let mut html = String::with_capacity(self.before.len() + body.len() + self.after.len());
        html.push_str(&self.before);
        html.push_str(body);
        html.push_str(&self.after);
        RenderedDocument(html)
    }
}

impl Default for Template {
    fn default() -> Self {
        let (before, after) = DEFAULT_TEMPLATE
            .split_once(DIAGRAM_SLOT)
            .unwrap_or((DEFAULT_TEMPLATE, ""));
        Self {
            before: before.to_string(),
            after: after.to_string(),
        }
    }
}

/// A complete, self-contained HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument(String);

impl RenderedDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Embed `payload` into `template`.
pub fn render(payload: &DiagramPayload, template: &Template) -> RenderedDocument {
    let doc = template.render(payload);
    debug!("Rendered {} bytes of HTML", doc.as_str().len());
    doc
}

/// Write `doc` to `path`, replacing any existing file.
///
/// The bytes go to a temporary file in the destination directory which is
/// then renamed over `path`, so a failed write never leaves a partial page.
pub fn write_document(doc: &RenderedDocument, path: &Path) -> Result<(), MindmapError> {
    let write_err = |source: std::io::Error| MindmapError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(doc.as_str().as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::diagram::extract_mermaid;

    fn payload(s: &str) -> DiagramPayload {
        extract_mermaid(&format!("```mermaid\n{s}\n```")).unwrap()
    }

    #[test]
    fn default_template_embeds_payload_once() {
        let p = payload("graph LR\n    A[Root] --> B(Leaf);");
        let html = render(&p, &Template::default()).into_string();
        assert_eq!(html.matches(p.as_str()).count(), 1);
        assert!(!html.contains(DIAGRAM_SLOT));
        assert!(html.contains("mermaid@10"));
    }

    #[test]
    fn payload_is_not_escaped() {
        let p = payload("graph LR\n    A[\"<b>x</b> & y\"] --> B");
        let html = render(&p, &Template::default()).into_string();
        assert!(html.contains("<b>x</b> & y"));
    }

    #[test]
    fn payload_containing_slot_text_is_verbatim() {
        let p = payload("A[\"{{ diagram }}\"]");
        let html = Template::new("<div>{{ diagram }}</div>").unwrap().render(&p);
        assert_eq!(html.as_str(), "<div>A[\"{{ diagram }}\"]</div>");
    }

    #[test]
    fn custom_template_needs_exactly_one_slot() {
        assert!(Template::new("<html></html>").is_err());
        assert!(Template::new("{{ diagram }}{{ diagram }}").is_err());
        assert!(Template::new("<pre>{{ diagram }}</pre>").is_ok());
    }

    #[test]
    fn write_document_creates_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/mindmap.html");
        let t = Template::new("<p>{{ diagram }}</p>").unwrap();

        write_document(&t.render(&payload("first")), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>first</p>");

        write_document(&t.render(&payload("second")), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>second</p>");

        // Only the output file remains; no temp files left behind.
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let err = write_document(
            &Template::default().render(&payload("A")),
            &blocker.join("mindmap.html"),
        )
        .unwrap_err();
        assert!(matches!(err, MindmapError::OutputWriteFailed { .. }));
    }
}
