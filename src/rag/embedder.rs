// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embedder client
//!
//! Batches texts through an [`EmbeddingProvider`], retrying each sub-batch
//! with exponential backoff. Output order always matches input order, and a
//! sub-batch that still fails after its retries fails the whole call with the
//! offending offset range. No partial results are returned.

use std::sync::Arc;
use tracing::{debug, info};

use super::errors::{RagError, RagResult};
use crate::providers::{EmbeddingProvider, ProviderError, RetryPolicy};

/// Default sub-batch size for embedding requests
pub const DEFAULT_MAX_BATCH_SIZE: usize = 96;

#[derive(Clone)]
pub struct EmbedderClient {
    provider: Arc<dyn EmbeddingProvider>,
    max_batch_size: usize,
    retry: RetryPolicy,
}

impl EmbedderClient {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        max_batch_size: usize,
        retry: RetryPolicy,
    ) -> RagResult<Self> {
        if max_batch_size == 0 {
            return Err(RagError::InvalidArgument(
                "max_batch_size must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            provider,
            max_batch_size,
            retry,
        })
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn model(&self) -> &str {
        self.provider.embedding_model()
    }

    /// Embed `texts`, one vector per text in input order
    pub async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for (batch_number, batch) in texts.chunks(self.max_batch_size).enumerate() {
            let start = batch_number * self.max_batch_size;
            let end = start + batch.len();

            debug!(
                "Embedding inputs {}..{} with {} ({})",
                start,
                end,
                self.provider.name(),
                self.provider.embedding_model()
            );

            let vectors = self
                .retry
                .run(move || async move {
                    let vectors = self.provider.embed(batch).await?;
                    if vectors.len() != batch.len() {
                        return Err(ProviderError::InvalidResponse(format!(
                            "expected {} embeddings, got {}",
                            batch.len(),
                            vectors.len()
                        )));
                    }
                    if vectors.iter().flatten().any(|v| !v.is_finite()) {
                        return Err(ProviderError::InvalidResponse(
                            "embedding contains NaN or Infinity".to_string(),
                        ));
                    }
                    Ok(vectors)
                })
                .await
                .map_err(|e| RagError::retrieval(start, end, RagError::upstream("embedding", e)))?;

            embeddings.extend(vectors);
        }

        if !texts.is_empty() {
            info!(
                "Embedded {} texts in {} request(s)",
                texts.len(),
                texts.len().div_ceil(self.max_batch_size)
            );
        }

        Ok(embeddings)
    }

    /// Embed a single text, typically a query
    pub async fn embed_one(&self, text: &str) -> RagResult<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::InvalidArgument("no embedding returned".to_string()))
    }
}
