//! Document discovery types and format-specific text extraction.
//!
//! Formats form a closed set, [`DocumentKind`]. The kind is resolved from the
//! file extension before any I/O happens, so an unknown format is rejected
//! without touching the file.

mod docx;
mod pdf;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::document::SourceText;
use crate::error::{RagError, Result};

/// The supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Portable Document Format (`.pdf`).
    Pdf,
    /// Word-processor document (`.docx`, `.doc`).
    WordDoc,
    /// UTF-8 plain text (`.txt`).
    PlainText,
}

impl DocumentKind {
    /// Lower-case extensions (without the dot) that map to a kind.
    pub const EXTENSIONS: &'static [&'static str] = &["pdf", "docx", "doc", "txt"];

    /// Resolve a kind from a bare extension, ignoring case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" | "doc" => Some(Self::WordDoc),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Resolve a kind from a path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::UnsupportedFormat`] when the extension is missing
    /// or not one of [`DocumentKind::EXTENSIONS`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        Self::from_extension(extension).ok_or_else(|| {
            error!(path = %path.display(), extension, "unsupported document format");
            RagError::UnsupportedFormat { path: path.to_path_buf(), extension: extension.to_string() }
        })
    }

    /// Extract text from a file of this kind.
    pub fn load_text(self, path: &Path) -> Result<Vec<SourceText>> {
        let source = path.display().to_string();
        match self {
            Self::Pdf => pdf::load(path, &source),
            Self::WordDoc => docx::load(path, &source),
            Self::PlainText => {
                let text = fs::read_to_string(path).map_err(|e| load_failure(path, e))?;
                Ok(vec![SourceText::new(text, source)])
            }
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pdf => "pdf",
            Self::WordDoc => "word",
            Self::PlainText => "text",
        };
        f.write_str(name)
    }
}

/// A file on disk with a recognized format. Read once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Location of the file.
    pub path: PathBuf,
    /// Format resolved from the extension.
    pub kind: DocumentKind,
}

impl Document {
    /// Create a document for `path`, rejecting unsupported extensions.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let kind = DocumentKind::from_path(&path)?;
        Ok(Self { path, kind })
    }

    /// Read and extract the document's text.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::LoadFailure`] if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Vec<SourceText>> {
        let sources = self.kind.load_text(&self.path).inspect_err(|e| {
            error!(path = %self.path.display(), kind = %self.kind, error = %e, "failed to load document");
        })?;
        debug!(path = %self.path.display(), kind = %self.kind, sections = sources.len(), "loaded document");
        Ok(sources)
    }
}

pub(crate) fn load_failure(path: &Path, err: impl fmt::Display) -> RagError {
    RagError::LoadFailure { path: path.to_path_buf(), message: err.to_string() }
}
