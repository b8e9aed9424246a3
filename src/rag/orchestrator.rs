// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retrieval orchestrator
//!
//! Answers one question against one session:
//! embed the question, search the session index, assemble the top chunks
//! into a context block and ask the chat provider. Each step is logged as a
//! state transition so a failed query shows where it stopped.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::embedder::EmbedderClient;
use super::errors::{RagError, RagResult};
use super::session_store::SessionStore;
use super::vector_index::ScoredChunk;
use crate::providers::{ChatMessage, ChatProvider, CompletionRequest, RetryPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    EmbeddingQuery,
    Searching,
    ContextAssembly,
    Generating,
    Done,
    Failed(String),
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryState::EmbeddingQuery => write!(f, "embedding_query"),
            QueryState::Searching => write!(f, "searching"),
            QueryState::ContextAssembly => write!(f, "context_assembly"),
            QueryState::Generating => write!(f, "generating"),
            QueryState::Done => write!(f, "done"),
            QueryState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Answer to a question about one document
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    pub relevant_chunks_used: usize,
    pub chunks: Vec<ScoredChunk>,
    pub filename: String,
    pub session_id: String,
}

#[derive(Clone)]
pub struct RetrievalOrchestrator {
    sessions: SessionStore,
    embedder: EmbedderClient,
    chat: Arc<dyn ChatProvider>,
    retry: RetryPolicy,
    max_context_chars: usize,
}

/// Tracks and logs the state of one query
struct QueryTrace<'a> {
    session_id: &'a str,
    state: QueryState,
}

impl<'a> QueryTrace<'a> {
    fn new(session_id: &'a str) -> Self {
        Self {
            session_id,
            state: QueryState::EmbeddingQuery,
        }
    }

    fn advance(&mut self, next: QueryState) {
        debug!("Query on {}: {} -> {}", self.session_id, self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: RagError) -> RagError {
        warn!(
            "Query on {} failed during {}: {}",
            self.session_id, self.state, error
        );
        self.state = QueryState::Failed(error.error_code().to_string());
        error
    }
}

impl RetrievalOrchestrator {
    pub fn new(
        sessions: SessionStore,
        embedder: EmbedderClient,
        chat: Arc<dyn ChatProvider>,
        retry: RetryPolicy,
        max_context_chars: usize,
    ) -> Self {
        Self {
            sessions,
            embedder,
            chat,
            retry,
            max_context_chars,
        }
    }

    /// Answer `question` from the `top_k` most similar chunks of a session
    pub async fn answer(
        &self,
        session_id: &str,
        question: &str,
        top_k: usize,
    ) -> RagResult<RagAnswer> {
        self.answer_with_model(session_id, question, top_k, None).await
    }

    /// Like [`answer`](Self::answer) with an optional chat model override
    pub async fn answer_with_model(
        &self,
        session_id: &str,
        question: &str,
        top_k: usize,
        model: Option<&str>,
    ) -> RagResult<RagAnswer> {
        if question.trim().is_empty() {
            return Err(RagError::InvalidArgument(
                "question must not be empty".to_string(),
            ));
        }
        if top_k == 0 {
            return Err(RagError::InvalidArgument(
                "top_k must be greater than 0".to_string(),
            ));
        }

        let session = self.sessions.get(session_id).await?;
        let mut trace = QueryTrace::new(session_id);

        let query = match self.embedder.embed_one(question).await {
            Ok(query) => query,
            Err(e) => return Err(trace.fail(e)),
        };

        trace.advance(QueryState::Searching);
        let chunks = match session.index.search(&query, top_k) {
            Ok(chunks) => chunks,
            Err(e) => return Err(trace.fail(e)),
        };

        trace.advance(QueryState::ContextAssembly);
        let context = assemble_context(&chunks, self.max_context_chars);
        let prompt = build_rag_prompt(&context, question);

        trace.advance(QueryState::Generating);
        let request = CompletionRequest {
            model: model.unwrap_or(self.chat.default_model()).to_string(),
            messages: vec![ChatMessage::user(prompt)],
        };
        let request = &request;
        let answer = match self
            .retry
            .run(move || self.chat.complete(request))
            .await
            .map_err(|e| RagError::upstream("generation", e))
        {
            Ok(answer) => answer,
            Err(e) => return Err(trace.fail(e)),
        };

        trace.advance(QueryState::Done);
        info!(
            "Answered question on {} ({}) with {} chunks",
            session_id,
            session.filename,
            chunks.len()
        );

        Ok(RagAnswer {
            answer,
            relevant_chunks_used: chunks.len(),
            chunks,
            filename: session.filename.clone(),
            session_id: session_id.to_string(),
        })
    }
}

/// Join chunk texts in rank order with a blank line, capped at `max_chars`
/// characters
pub fn assemble_context(chunks: &[ScoredChunk], max_chars: usize) -> String {
    let joined = chunks
        .iter()
        .map(|c| c.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    match joined.char_indices().nth(max_chars) {
        Some((byte_index, _)) => joined[..byte_index].to_string(),
        None => joined,
    }
}

pub fn build_rag_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant that answers questions based on the provided context from a PDF document.\n\
         \n\
         Context from the PDF:\n\
         {}\n\
         \n\
         Question: {}\n\
         \n\
         Please answer the question based on the context provided. If the context doesn't contain enough information to answer the question, say so. Keep your answer concise and relevant.",
        context, question
    )
}
