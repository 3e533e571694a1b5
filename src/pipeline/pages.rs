//! Page loading: extract per-page text from a PDF via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and must not run on a Tokio worker thread. Both entry points hop to
//! the blocking pool and are awaited before the pipeline moves on.
//!
//! ## Partial extraction
//!
//! A page whose text layer cannot be read becomes an empty [`Page`] and a
//! `warn!`, rather than failing the document: a single bad page must not
//! cost the user the whole summary.

use crate::error::MindmapError;
use crate::output::DocumentMetadata;
use crate::pipeline::clean::clean_page_text;
use pdfium_render::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming a pdfium library file or its directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// The text of one PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    index: usize,
    text: String,
}

impl Page {
    /// A page at 0-based position `index`.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extract the cleaned text of every page, in document order.
pub async fn load_pages(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<Vec<Page>, MindmapError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || load_pages_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| MindmapError::Internal(format!("Text extraction task panicked: {}", e)))?
}

/// Blocking implementation of page text extraction.
fn load_pages_blocking(pdf_path: &Path, password: Option<&str>) -> Result<Vec<Page>, MindmapError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let pdf_pages = document.pages();
    info!("PDF loaded: {} pages", pdf_pages.len());

    let mut pages = Vec::with_capacity(pdf_pages.len() as usize);
    for (index, page) in pdf_pages.iter().enumerate() {
        let raw = match page.text() {
            Ok(text) => text.all(),
            Err(e) => {
                warn!("Page {}: text layer unreadable ({:?}); treating as blank", index + 1, e);
                String::new()
            }
        };
        let text = clean_page_text(&raw);
        if text.is_empty() {
            debug!("Page {} has no text", index + 1);
        }
        pages.push(Page::new(index, text));
    }

    Ok(pages)
}

/// Extract document metadata without reading page text.
pub async fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, MindmapError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| MindmapError::Internal(format!("Metadata task panicked: {}", e)))?
}

fn extract_metadata_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, MindmapError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;
    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, MindmapError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                MindmapError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                MindmapError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            MindmapError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Bind to a pdfium library.
///
/// Lookup order: `PDFIUM_LIB_PATH` (file or directory), the directory of
/// the running executable, the working directory, then the system library
/// search path.
fn bind_pdfium() -> Result<Pdfium, MindmapError> {
    if let Some(configured) = std::env::var_os(PDFIUM_LIB_PATH_ENV) {
        let path = library_file(PathBuf::from(configured));
        debug!("Binding pdfium from {}", path.display());
        return Pdfium::bind_to_library(&path)
            .map(Pdfium::new)
            .map_err(|e| {
                MindmapError::PdfiumBindingFailed(format!("{}: {:?}", path.display(), e))
            });
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));
    let candidates = exe_dir.into_iter().chain(std::iter::once(PathBuf::from(".")));
    for dir in candidates {
        let path = Pdfium::pdfium_platform_library_name_at_path(&dir);
        if path.exists() {
            if let Ok(bindings) = Pdfium::bind_to_library(&path) {
                debug!("Bound pdfium from {}", path.display());
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| MindmapError::PdfiumBindingFailed(format!("{:?}", e)))
}

/// A directory given in `PDFIUM_LIB_PATH` means "the platform library inside it".
fn library_file(path: PathBuf) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(&path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_accessors() {
        let p = Page::new(2, "  \n ");
        assert_eq!(p.index(), 2);
        assert!(p.is_blank());
        assert!(!Page::new(0, "text").is_blank());
    }

    #[test]
    fn library_file_keeps_explicit_file() {
        let file = PathBuf::from("/opt/pdfium/lib/libpdfium.so");
        assert_eq!(library_file(file.clone()), file);
    }

    #[test]
    fn library_file_expands_directory() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = library_file(dir.path().to_path_buf());
        assert_eq!(resolved.parent(), Some(dir.path()));
        assert_ne!(resolved, dir.path());
    }
}
