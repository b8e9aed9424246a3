// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-memory vector index for one document
//!
//! Maps chunk id to (chunk, embedding) and answers k-nearest-neighbour
//! queries by linear-scan cosine similarity. Built once per upload and
//! read-only afterwards; the whole index is dropped with its session.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::chunker::Chunk;
use super::errors::{RagError, RagResult};
use super::similarity::cosine_similarity;

/// Entry stored in the index
#[derive(Clone, Debug)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Result from a similarity search
#[derive(Clone, Debug, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

#[derive(Debug, Default)]
pub struct VectorIndex {
    /// Entries in insertion order (tie-break order for search)
    entries: Vec<IndexEntry>,
    positions: HashMap<String, usize>,
    dimension: Option<usize>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert chunks with their embeddings
    ///
    /// All embeddings must share the index dimension (fixed by the first
    /// insert) and contain only finite values. Nothing is inserted unless
    /// the whole batch is valid.
    pub fn insert(&mut self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> RagResult<()> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::InvalidArgument(format!(
                "got {} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut dimension = self.dimension;
        for embedding in &embeddings {
            if embedding.is_empty() {
                return Err(RagError::InvalidArgument(
                    "embeddings must not be empty".to_string(),
                ));
            }
            match dimension {
                Some(expected) if expected != embedding.len() => {
                    return Err(RagError::DimensionMismatch {
                        expected,
                        actual: embedding.len(),
                    });
                }
                Some(_) => {}
                None => dimension = Some(embedding.len()),
            }
            // NaN or Infinity would break score ordering
            if embedding.iter().any(|v| !v.is_finite()) {
                return Err(RagError::InvalidArgument(
                    "embedding contains NaN or Infinity".to_string(),
                ));
            }
        }

        let mut batch_ids: HashSet<&str> = HashSet::with_capacity(chunks.len());
        for chunk in &chunks {
            if !batch_ids.insert(chunk.id.as_str()) || self.positions.contains_key(&chunk.id) {
                return Err(RagError::InvalidArgument(format!(
                    "duplicate chunk id: {}",
                    chunk.id
                )));
            }
        }

        self.dimension = dimension;
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            self.positions.insert(chunk.id.clone(), self.entries.len());
            self.entries.push(IndexEntry { chunk, embedding });
        }

        Ok(())
    }

    /// Top-`k` chunks by cosine similarity, highest score first
    ///
    /// Equal scores keep insertion order. `k` larger than the index is
    /// clamped; an empty index returns no results.
    pub fn search(&self, query: &[f32], k: usize) -> RagResult<Vec<ScoredChunk>> {
        self.search_with_threshold(query, k, None)
    }

    /// Like [`search`](Self::search), dropping results below `min_score`
    pub fn search_with_threshold(
        &self,
        query: &[f32],
        k: usize,
        min_score: Option<f32>,
    ) -> RagResult<Vec<ScoredChunk>> {
        let dimension = match self.dimension {
            Some(dimension) => dimension,
            None => return Ok(Vec::new()),
        };

        if query.len() != dimension {
            return Err(RagError::DimensionMismatch {
                expected: dimension,
                actual: query.len(),
            });
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(RagError::InvalidArgument(
                "query contains NaN or Infinity".to_string(),
            ));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(query, &entry.embedding)))
            .filter(|(_, score)| min_score.map_or(true, |min| *score >= min))
            .collect();

        // Stable sort: ties stay in insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k.min(self.entries.len()));

        Ok(scored
            .into_iter()
            .map(|(position, score)| ScoredChunk {
                chunk: self.entries[position].chunk.clone(),
                score,
            })
            .collect())
    }

    /// Get an entry by chunk id
    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.positions.get(id).map(|&position| &self.entries[position])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension, once anything has been inserted
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}
