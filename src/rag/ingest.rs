// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload pipeline: extract → chunk → embed → index → session

use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::chunker::Chunker;
use super::embedder::EmbedderClient;
use super::errors::{RagError, RagResult};
use super::extractor::{is_pdf_filename, TextExtractor};
use super::session_store::{SessionStore, SessionSummary};
use super::vector_index::VectorIndex;

#[derive(Clone)]
pub struct DocumentIngestor {
    extractor: Arc<dyn TextExtractor>,
    chunker: Chunker,
    embedder: EmbedderClient,
    sessions: SessionStore,
}

impl DocumentIngestor {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        chunker: Chunker,
        embedder: EmbedderClient,
        sessions: SessionStore,
    ) -> Self {
        Self {
            extractor,
            chunker,
            embedder,
            sessions,
        }
    }

    /// Index an uploaded document as a new session
    ///
    /// The session is only registered once every chunk has been embedded and
    /// inserted; any failure leaves the store untouched.
    pub async fn ingest(&self, filename: &str, bytes: Vec<u8>) -> RagResult<SessionSummary> {
        if !is_pdf_filename(filename) {
            return Err(RagError::UnsupportedFormat {
                filename: filename.to_string(),
            });
        }
        if bytes.is_empty() {
            return Err(RagError::InvalidArgument(format!("{} is empty", filename)));
        }

        let started = Instant::now();
        let text = self.extract(filename, bytes).await?;
        if text.trim().is_empty() {
            return Err(RagError::ExtractionFailed {
                filename: filename.to_string(),
                reason: "no text could be extracted".to_string(),
            });
        }

        let chunks = self.chunker.split(&text);
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let chunk_count = chunks.len();
        let mut index = VectorIndex::new();
        index.insert(chunks, embeddings)?;

        let summary = self.sessions.create(filename, index, chunk_count).await;

        info!(
            "Indexed {} into {} chunks in {:?}",
            filename,
            chunk_count,
            started.elapsed()
        );
        Ok(summary)
    }

    async fn extract(&self, filename: &str, bytes: Vec<u8>) -> RagResult<String> {
        let extractor = self.extractor.clone();
        let name = filename.to_string();

        tokio::task::spawn_blocking(move || extractor.extract(&name, &bytes))
            .await
            .map_err(|e| RagError::ExtractionFailed {
                filename: filename.to_string(),
                reason: format!("extraction task failed: {}", e),
            })?
    }
}
