// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fake providers shared by the integration suites
#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use rag_chat_node::{
    config::NodeConfig,
    providers::{
        ChatProvider, CompletionRequest, EmbeddingProvider, ProviderError, RetryPolicy, TextStream,
    },
    rag::{
        Chunker, DocumentIngestor, EmbedderClient, RagError, RagResult, RetrievalOrchestrator,
        SessionStore, TextExtractor,
    },
    AppState,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Letter-frequency embedding plus a constant component, so no text maps
/// to the zero vector and similar texts score close to each other
pub fn letter_embedding(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 27];
    for c in text.chars().flat_map(|c| c.to_lowercase()) {
        if c.is_ascii_lowercase() {
            v[(c as u8 - b'a') as usize] += 1.0;
        }
    }
    v[26] = 0.5;
    v
}

/// Deterministic embedding provider that records every batch it receives
#[derive(Default)]
pub struct FakeEmbeddings {
    pub batches: Mutex<Vec<Vec<String>>>,
}

impl FakeEmbeddings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(|b| b.len()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbeddings {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.batches.lock().unwrap().push(texts.to_vec());
        Ok(texts.iter().map(|t| letter_embedding(t)).collect())
    }

    fn embedding_model(&self) -> &str {
        "fake-embedding"
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Embedding provider that replays scripted failures before succeeding
pub struct ScriptedEmbeddings {
    script: Mutex<VecDeque<ProviderError>>,
    pub calls: AtomicUsize,
    inner: FakeEmbeddings,
}

impl ScriptedEmbeddings {
    pub fn new(failures: Vec<ProviderError>) -> Self {
        Self {
            script: Mutex::new(failures.into()),
            calls: AtomicUsize::new(0),
            inner: FakeEmbeddings::new(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for ScriptedEmbeddings {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(error) => Err(error),
            None => self.inner.embed(texts).await,
        }
    }

    fn embedding_model(&self) -> &str {
        "scripted-embedding"
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Embedding provider that fails only for batches containing `poison`
pub struct PoisonedEmbeddings {
    pub poison: String,
    pub calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for PoisonedEmbeddings {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if texts.iter().any(|t| t == &self.poison) {
            return Err(ProviderError::Api {
                status: 503,
                message: "overloaded".to_string(),
            });
        }
        Ok(texts.iter().map(|t| letter_embedding(t)).collect())
    }

    fn embedding_model(&self) -> &str {
        "poisoned-embedding"
    }

    fn name(&self) -> &'static str {
        "poisoned"
    }
}

/// Chat provider returning a canned answer and recording requests
pub struct FakeChat {
    pub answer: String,
    pub fragments: Vec<String>,
    pub requests: Mutex<Vec<CompletionRequest>>,
    pub failure: Mutex<Option<ProviderError>>,
}

impl FakeChat {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            fragments: vec!["Hel".to_string(), "lo".to_string(), "!".to_string()],
            requests: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        let chat = Self::new("");
        *chat.failure.lock().unwrap() = Some(error);
        chat
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn check_failure(&self) -> Result<(), ProviderError> {
        match self.failure.lock().unwrap().as_ref() {
            Some(ProviderError::Api { status, message }) => Err(ProviderError::Api {
                status: *status,
                message: message.clone(),
            }),
            Some(ProviderError::MissingApiKey { provider }) => Err(ProviderError::MissingApiKey {
                provider: provider.clone(),
            }),
            Some(_) => Err(ProviderError::Transport("chat unavailable".to_string())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChatProvider for FakeChat {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        self.check_failure()?;
        Ok(self.answer.clone())
    }

    async fn stream(&self, request: &CompletionRequest) -> Result<TextStream, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        self.check_failure()?;
        let fragments: Vec<Result<String, ProviderError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        Ok(Box::pin(stream::iter(fragments)))
    }

    fn default_model(&self) -> &str {
        "gpt-4.1-mini"
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Extractor returning fixed text for any input
pub struct FakeExtractor {
    pub text: String,
    pub calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextExtractor for FakeExtractor {
    fn extract(&self, _filename: &str, _bytes: &[u8]) -> RagResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Extractor that always fails
pub struct BrokenExtractor;

impl TextExtractor for BrokenExtractor {
    fn extract(&self, filename: &str, _bytes: &[u8]) -> RagResult<String> {
        Err(RagError::ExtractionFailed {
            filename: filename.to_string(),
            reason: "corrupt xref table".to_string(),
        })
    }
}

pub const SAMPLE_TEXT: &str = "The mitochondria is the powerhouse of the cell. \
Photosynthesis converts sunlight into chemical energy in plants. \
Rust guarantees memory safety without a garbage collector.";

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::immediate(3)
}

pub fn embedder(provider: Arc<dyn EmbeddingProvider>, batch_size: usize) -> EmbedderClient {
    EmbedderClient::new(provider, batch_size, fast_retry()).unwrap()
}

/// Ingestor and orchestrator sharing one store
pub struct Harness {
    pub sessions: SessionStore,
    pub ingestor: DocumentIngestor,
    pub orchestrator: RetrievalOrchestrator,
    pub embeddings: Arc<FakeEmbeddings>,
    pub extractor: Arc<FakeExtractor>,
    pub chat: Arc<FakeChat>,
}

pub fn harness(text: &str, chunk_size: usize, overlap: usize) -> Harness {
    let sessions = SessionStore::new();
    let embeddings = Arc::new(FakeEmbeddings::new());
    let extractor = Arc::new(FakeExtractor::new(text));
    let chat = Arc::new(FakeChat::new("The mitochondria."));
    let client = embedder(embeddings.clone(), 4);

    let ingestor = DocumentIngestor::new(
        extractor.clone(),
        Chunker::new(chunk_size, overlap).unwrap(),
        client.clone(),
        sessions.clone(),
    );
    let orchestrator =
        RetrievalOrchestrator::new(sessions.clone(), client, chat.clone(), fast_retry(), 12_000);

    Harness {
        sessions,
        ingestor,
        orchestrator,
        embeddings,
        extractor,
        chat,
    }
}

/// Application state wired to fakes
pub fn test_state(chat: Arc<FakeChat>, extractor: Arc<dyn TextExtractor>) -> AppState {
    let mut config = NodeConfig::default();
    config.rag.chunk_size = 60;
    config.rag.chunk_overlap = 10;
    config.provider.max_attempts = 2;
    config.provider.initial_backoff_ms = 1;
    config.provider.max_backoff_ms = 5;

    AppState::new(
        config,
        Arc::new(FakeEmbeddings::new()),
        chat,
        extractor,
        true,
    )
    .unwrap()
}
