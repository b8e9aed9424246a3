// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hosted model providers
//!
//! The retrieval core never computes embeddings or generates text itself.
//! It talks to these two capability traits; [`openai::OpenAiClient`]
//! implements both against an OpenAI-compatible HTTP API.

pub mod errors;
pub mod openai;
pub mod retry;

use async_trait::async_trait;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

pub use errors::ProviderError;
pub use openai::OpenAiClient;
pub use retry::{RetryError, RetryPolicy};

/// Lazy, finite, non-restartable sequence of generated text fragments.
/// Dropping it cancels consumption.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    Developer,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn developer(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Developer, content)
    }
}

/// A chat-completion request in provider-neutral form
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Hosted embedding endpoint: batch of texts in, one vector per text out
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `texts`; the i-th vector belongs to the i-th text
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Model used for embeddings
    fn embedding_model(&self) -> &str;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Hosted chat-completion endpoint
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Generate the full answer in one response
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Generate the answer as a stream of text fragments
    async fn stream(&self, request: &CompletionRequest) -> Result<TextStream, ProviderError>;

    /// Model used when the caller does not name one
    fn default_model(&self) -> &str;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
