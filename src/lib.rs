// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod providers;
pub mod rag;
pub mod version;

// Re-export main types
pub use api::{create_app, start_server, ApiError, AppState};
pub use config::{NodeConfig, ProviderConfig, RagSettings};
pub use providers::{
    ChatProvider, EmbeddingProvider, OpenAiClient, ProviderError, RetryPolicy, TextStream,
};
pub use rag::{
    Chunk, Chunker, DocumentIngestor, EmbedderClient, RagAnswer, RagError, RagResult,
    RetrievalOrchestrator, ScoredChunk, SessionStore, SessionSummary, VectorIndex,
};
