use std::path::Path;

use pdf_oxide::PdfDocument;
use tracing::{debug, info};

use super::load_failure;
use crate::document::{PAGE_KEY, SourceText};
use crate::error::Result;

/// Extract one [`SourceText`] per page that has text, tagged with its
/// zero-based page number.
pub(super) fn load(path: &Path, source: &str) -> Result<Vec<SourceText>> {
    let mut doc = PdfDocument::open(path)
        .map_err(|e| load_failure(path, format!("failed to parse PDF: {e}")))?;

    let page_count = doc
        .page_count()
        .map_err(|e| load_failure(path, format!("failed to read page count: {e}")))?;

    let mut pages = Vec::with_capacity(page_count);
    for page_index in 0..page_count {
        let text = doc
            .extract_text(page_index)
            .map_err(|e| load_failure(path, format!("failed to read page {page_index}: {e}")))?;

        if text.trim().is_empty() {
            debug!(path = %path.display(), page = page_index, "skipping page without text");
            continue;
        }
        pages.push(SourceText::new(text, source).with_metadata(PAGE_KEY, page_index.to_string()));
    }

    info!(path = %path.display(), page_count, text_pages = pages.len(), "PDF text extraction complete");
    Ok(pages)
}
