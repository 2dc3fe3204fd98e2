use std::path::Path;

use mupdf::{Document, TextPageFlags};

use crate::extract::{ExtractError, TextExtractor};

/// MuPDF-backed [`TextExtractor`].
///
/// Extracts text page by page, concatenates pages, and trims the result. No
/// layout reconstruction is attempted beyond MuPDF's block/line iteration.
#[derive(Default)]
pub struct MupdfExtractor;

impl MupdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for MupdfExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ExtractError::Open("invalid path encoding".into()))?;

        let document = Document::open(path_str).map_err(|e| ExtractError::Open(e.to_string()))?;

        let mut pages_text = Vec::new();
        for page_result in document
            .pages()
            .map_err(|e| ExtractError::Extraction(e.to_string()))?
        {
            let page = page_result.map_err(|e| ExtractError::Extraction(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| ExtractError::Extraction(e.to_string()))?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text);
        }

        Ok(pages_text.join("\n").trim().to_string())
    }
}
