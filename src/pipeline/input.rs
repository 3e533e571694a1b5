//! Input resolution: check that a user-supplied path names a readable PDF.
//!
//! pdfium reports a missing file, a permissions problem and a JPEG renamed
//! to `.pdf` with the same opaque "format error". Checking existence, read
//! access and the `%PDF` magic bytes up front gives the user a message that
//! says what is actually wrong.

use crate::error::MindmapError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local path: it must exist, be readable and start with `%PDF`.
pub fn resolve_input(path: impl AsRef<Path>) -> Result<PathBuf, MindmapError> {
    let path = path.as_ref().to_path_buf();

    if !path.is_file() {
        return Err(MindmapError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            match f.read_exact(&mut magic) {
                Ok(()) if &magic != b"%PDF" => {
                    return Err(MindmapError::NotAPdf { path, magic });
                }
                Ok(()) => {}
                // Shorter than four bytes: cannot be a PDF either.
                Err(_) => return Err(MindmapError::NotAPdf { path, magic }),
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(MindmapError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(MindmapError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
