// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the retrieval core
//!
//! Every failure of chunking, indexing, session lookup, ingestion or
//! question answering surfaces as one of these variants. Callers can match
//! on the kind; the HTTP layer maps each kind to its own status code.

use thiserror::Error;

use crate::providers::{ProviderError, RetryError};

/// Errors produced by the retrieval core
#[derive(Error, Debug)]
pub enum RagError {
    /// Bad parameters (chunk size, overlap, batch lengths, empty input)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Uploaded document is not a supported type (PDF only)
    #[error("Unsupported format: {filename} (only PDF files are allowed)")]
    UnsupportedFormat { filename: String },

    /// Unknown session identifier
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Embedding dimension does not match the index
    #[error("Dimension mismatch: expected {expected}D, got {actual}D")]
    DimensionMismatch { expected: usize, actual: usize },

    /// No usable text could be extracted from the document
    #[error("Text extraction failed for {filename}: {reason}")]
    ExtractionFailed { filename: String, reason: String },

    /// Embedding or search pipeline failure for a range of inputs
    #[error("Retrieval failed for inputs {start}..{end}: {source}")]
    Retrieval {
        start: usize,
        end: usize,
        #[source]
        source: Box<RagError>,
    },

    /// External API failure after the retry budget was spent
    #[error("Upstream {operation} failed after {attempts} attempt(s): {source}")]
    Upstream {
        operation: &'static str,
        attempts: usize,
        #[source]
        source: ProviderError,
    },
}

impl RagError {
    /// Get error code for logging and API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            RagError::InvalidArgument(_) => "INVALID_ARGUMENT",
            RagError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            RagError::NotFound(_) => "NOT_FOUND",
            RagError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            RagError::ExtractionFailed { .. } => "EXTRACTION_FAILED",
            RagError::Retrieval { .. } => "RETRIEVAL_ERROR",
            RagError::Upstream { .. } => "UPSTREAM_ERROR",
        }
    }

    /// Get user-friendly error message for API responses
    pub fn user_message(&self) -> String {
        match self {
            RagError::UnsupportedFormat { filename } => {
                format!("'{}' is not a PDF. Only PDF files are allowed.", filename)
            }
            RagError::NotFound(session_id) => format!(
                "Session '{}' not found. Please upload the document first.",
                session_id
            ),
            RagError::ExtractionFailed { filename, .. } => {
                format!("No text could be extracted from '{}'", filename)
            }
            RagError::Retrieval { start, end, .. } => format!(
                "Failed to embed inputs {}..{}; the document was not indexed",
                start, end
            ),
            RagError::Upstream { operation, .. } => {
                format!("The language model provider failed during {}", operation)
            }
            _ => self.to_string(),
        }
    }

    /// Wrap an error as a retrieval failure over `[start, end)`
    pub fn retrieval(start: usize, end: usize, source: RagError) -> Self {
        RagError::Retrieval {
            start,
            end,
            source: Box::new(source),
        }
    }

    /// Wrap a provider call that exhausted its retries
    pub fn upstream(operation: &'static str, error: RetryError) -> Self {
        RagError::Upstream {
            operation,
            attempts: error.attempts,
            source: error.source,
        }
    }
}

pub type RagResult<T> = std::result::Result<T, RagError>;
