//! Text extraction from uploaded document bytes

use crate::error::{Result, SkillGapError};
use crate::input::file_detector::FileType;
use log::debug;

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    /// Page texts joined by newlines; pages without text contribute an empty string
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed documents
        let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
            .map_err(|_| SkillGapError::Extraction("PDF parser crashed on this document".to_string()))?
            .map_err(|e| SkillGapError::Extraction(format!("Failed to extract text from PDF: {}", e)))?;

        debug!("Extracted {} PDF pages", pages.len());
        Ok(pages.join("\n"))
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    /// UTF-8, falling back to Latin-1 when the bytes are not valid UTF-8
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => {
                debug!("Text is not valid UTF-8, decoding as Latin-1");
                Ok(bytes.iter().map(|&b| b as char).collect())
            }
        }
    }
}

/// Best-effort decoding for files of unknown type
pub struct LossyTextExtractor;

impl TextExtractor for LossyTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Extract text from a document, choosing the extractor from the file name's extension
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String> {
    match FileType::from_filename(file_name) {
        FileType::Pdf => PdfExtractor.extract(bytes),
        FileType::Text => PlainTextExtractor.extract(bytes),
        FileType::Unknown => LossyTextExtractor.extract(bytes),
    }
}
