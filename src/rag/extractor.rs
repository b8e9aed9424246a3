// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document text extraction

use tracing::{debug, warn};

use super::errors::{RagError, RagResult};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Turns an uploaded document into plain text
///
/// Implementations are synchronous and CPU-bound; callers run them on the
/// blocking pool.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, filename: &str, bytes: &[u8]) -> RagResult<String>;
}

/// `true` when the filename ends in `.pdf` (any case)
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

/// Extracts the text layer of a PDF with `pdf-extract`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, filename: &str, bytes: &[u8]) -> RagResult<String> {
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(RagError::ExtractionFailed {
                filename: filename.to_string(),
                reason: "file does not start with a PDF header".to_string(),
            });
        }

        let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            warn!("PDF extraction failed for {}: {}", filename, e);
            RagError::ExtractionFailed {
                filename: filename.to_string(),
                reason: e.to_string(),
            }
        })?;

        debug!("Extracted {} characters from {}", text.chars().count(), filename);
        Ok(text)
    }
}
