use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::load_failure;
use crate::document::SourceText;
use crate::error::Result;

/// The main document part of an OOXML word-processing package.
const DOCUMENT_PART: &str = "word/document.xml";

/// Extract the body text of a `.docx` package.
///
/// Legacy binary `.doc` files are not zip containers and fail here.
pub(super) fn load(path: &Path, source: &str) -> Result<Vec<SourceText>> {
    let file = File::open(path).map_err(|e| load_failure(path, e))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| load_failure(path, format!("not a word-processing package: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| load_failure(path, format!("missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| load_failure(path, e))?;

    let text = document_xml_to_text(&xml).map_err(|e| load_failure(path, e))?;
    Ok(vec![SourceText::new(text, source)])
}

/// Flatten `word/document.xml` into text: one line per paragraph, with
/// tabs and explicit breaks kept.
pub(super) fn document_xml_to_text(xml: &str) -> std::result::Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out.trim_end().to_string())
}
