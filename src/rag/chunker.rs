// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fixed-size character chunker
//!
//! Splits extracted document text into overlapping windows of `chunk_size`
//! characters. Each window starts `chunk_size - overlap` characters after
//! the previous one; the last window may be shorter. Sizes count Unicode
//! scalar values, so a window never ends inside a multi-byte character.

use serde::{Deserialize, Serialize};

use super::errors::{RagError, RagResult};

/// A contiguous slice of document text, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Opaque identifier, unique within one document
    pub id: String,
    /// Chunk text
    pub text: String,
    /// Character offset of the chunk start in the source text
    pub source_offset: usize,
}

impl Chunk {
    /// Number of characters in this chunk
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Chunking parameters, validated at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl Chunker {
    /// Create a chunker; requires `chunk_size > 0` and `overlap < chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> RagResult<Self> {
        if chunk_size == 0 {
            return Err(RagError::InvalidArgument(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(RagError::InvalidArgument(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between consecutive window starts
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Split `text` into overlapping windows
    ///
    /// Empty text yields no chunks. Splitting stops at the first window that
    /// reaches the end of the text.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        // Byte offset of every character, so windows slice on char boundaries
        let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let total = boundaries.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total {
            let end = (start + self.chunk_size).min(total);
            let byte_start = boundaries[start];
            let byte_end = if end == total {
                text.len()
            } else {
                boundaries[end]
            };

            chunks.push(Chunk {
                id: format!("chunk-{}", chunks.len()),
                text: text[byte_start..byte_end].to_string(),
                source_offset: start,
            });

            if end == total {
                break;
            }
            start += self.step();
        }

        chunks
    }
}

/// Split `text` into windows of `chunk_size` characters overlapping by
/// `overlap` characters
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> RagResult<Vec<Chunk>> {
    Ok(Chunker::new(chunk_size, overlap)?.split(text))
}
