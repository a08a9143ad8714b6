//! Input documents and filename-derived provenance.

use std::path::{Path, PathBuf};

use crate::error::ExtractionError;

/// Supplier label used when nothing better is known.
pub const UNKNOWN_SUPPLIER: &str = "Unknown";

/// One input file, read into memory.
#[derive(Debug, Clone)]
pub struct Document {
    /// Location on local storage.
    pub path: PathBuf,
    /// File name without directories.
    pub file_name: String,
    /// Supplier guessed from the file name.
    pub supplier_guess: String,
    /// Raw file content.
    pub data: Vec<u8>,
}

impl Document {
    /// Read a document from disk.
    pub fn open(path: &Path) -> Result<Self, ExtractionError> {
        let data = std::fs::read(path).map_err(|e| ExtractionError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_bytes(path, data))
    }

    /// Wrap bytes already in memory.
    pub fn from_bytes(path: &Path, data: Vec<u8>) -> Self {
        Self {
            path: path.to_path_buf(),
            file_name: file_name(path),
            supplier_guess: supplier_guess(path),
            data,
        }
    }
}

/// File name component of a path, or the whole path when it has none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Guess the supplier from a file name.
///
/// `AcmeCorp_invoice_2024.pdf` gives `AcmeCorp`; without an underscore the
/// whole stem is used. An empty token falls back to [`UNKNOWN_SUPPLIER`].
pub fn supplier_guess(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let token = stem.split('_').next().unwrap_or("").trim();
    if token.is_empty() {
        UNKNOWN_SUPPLIER.to_string()
    } else {
        token.to_string()
    }
}
