//! Recursive discovery of supported documents in a folder.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{RagError, Result};
use crate::loader::DocumentKind;

/// Return every supported document under `root`, sorted by path.
///
/// A missing folder is created (with parents) and treated as empty.
///
/// # Errors
///
/// Returns [`RagError::LoadFailure`] if the folder cannot be created or
/// `root` exists but is not a directory.
pub fn discover_documents(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.exists() {
        fs::create_dir_all(root).map_err(|e| RagError::LoadFailure {
            path: root.to_path_buf(),
            message: format!("failed to create document folder: {e}"),
        })?;
        info!(path = %root.display(), "created document folder");
        return Ok(Vec::new());
    }
    if !root.is_dir() {
        return Err(RagError::LoadFailure {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| DocumentKind::from_extension(ext).is_some())
        })
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();

    files.sort();
    info!(path = %root.display(), document_count = files.len(), "scanned document folder");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_folder_and_returns_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("reference_docs/nested");

        let files = discover_documents(&root).unwrap();

        assert!(files.is_empty());
        assert!(root.is_dir());
    }

    #[test]
    fn finds_supported_files_recursively() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("a/b")).unwrap();

        fs::write(root.join("one.txt"), "one").unwrap();
        fs::write(root.join("a/two.PDF"), "pdf").unwrap();
        fs::write(root.join("a/b/three.docx"), "docx").unwrap();
        fs::write(root.join("a/b/legacy.doc"), "doc").unwrap();
        fs::write(root.join("a/notes.md"), "ignored").unwrap();
        fs::write(root.join("no_extension"), "ignored").unwrap();

        let files = discover_documents(root).unwrap();

        assert_eq!(files.len(), 4);
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
        assert!(files.iter().all(|p| DocumentKind::from_path(p).is_ok()));
    }

    #[test]
    fn rejects_a_file_as_root() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        assert!(discover_documents(temp.path()).is_err());
    }
}
