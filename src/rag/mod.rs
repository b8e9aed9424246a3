// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// RAG (Retrieval-Augmented Generation) core
// Per-upload vector indices, session registry and question answering

pub mod chunker;
pub mod embedder;
pub mod errors;
pub mod extractor;
pub mod ingest;
pub mod orchestrator;
pub mod session_store;
pub mod similarity;
pub mod vector_index;

pub use chunker::{split, Chunk, Chunker};
pub use embedder::{EmbedderClient, DEFAULT_MAX_BATCH_SIZE};
pub use errors::{RagError, RagResult};
pub use extractor::{is_pdf_filename, PdfTextExtractor, TextExtractor};
pub use ingest::DocumentIngestor;
pub use orchestrator::{QueryState, RagAnswer, RetrievalOrchestrator};
pub use session_store::{Session, SessionStore, SessionSummary};
pub use similarity::cosine_similarity;
pub use vector_index::{IndexEntry, ScoredChunk, VectorIndex};
