// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded
//! by the binary first). Missing or unparsable values fall back to defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::providers::RetryPolicy;

/// Top-level configuration for the node
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Interface the HTTP server binds to
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Largest accepted request body (uploads)
    pub max_upload_bytes: usize,
    /// Allowed CORS origins; empty means any origin
    pub cors_allowed_origins: Vec<String>,
    /// Hosted model provider settings
    pub provider: ProviderConfig,
    /// Retrieval settings
    pub rag: RagSettings,
}

/// Hosted model provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// OpenAI API key
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Embedding model name
    pub embedding_model: String,
    /// Default chat model name
    pub chat_model: String,
    /// Timeout for a single provider request in milliseconds
    pub request_timeout_ms: u64,
    /// Attempts per provider call, including the first
    pub max_attempts: usize,
    /// First backoff delay in milliseconds
    pub initial_backoff_ms: u64,
    /// Backoff ceiling in milliseconds
    pub max_backoff_ms: u64,
}

/// Chunking and retrieval settings
#[derive(Debug, Clone)]
pub struct RagSettings {
    /// Characters per chunk
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
    /// Chunks retrieved per question
    pub top_k: usize,
    /// Texts per embedding request
    pub embed_batch_size: usize,
    /// Character budget for the context block sent to the chat model
    pub max_context_chars: usize,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl NodeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("API_HOST").unwrap_or(defaults.host),
            port: env_or("API_PORT", defaults.port),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            provider: ProviderConfig::from_env(),
            rag: RagSettings::from_env(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("API port must be greater than 0".to_string());
        }
        if self.max_upload_bytes == 0 {
            return Err("Maximum upload size must be greater than 0".to_string());
        }
        self.provider.validate()?;
        self.rag.validate()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 20 * 1024 * 1024,
            cors_allowed_origins: Vec::new(),
            provider: ProviderConfig::default(),
            rag: RagSettings::default(),
        }
    }
}

impl ProviderConfig {
    /// Load provider configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            embedding_model: env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            chat_model: env::var("CHAT_MODEL").unwrap_or(defaults.chat_model),
            request_timeout_ms: env_or("PROVIDER_TIMEOUT_MS", defaults.request_timeout_ms),
            max_attempts: env_or("PROVIDER_MAX_RETRIES", defaults.max_attempts),
            initial_backoff_ms: env_or("PROVIDER_INITIAL_BACKOFF_MS", defaults.initial_backoff_ms),
            max_backoff_ms: env_or("PROVIDER_MAX_BACKOFF_MS", defaults.max_backoff_ms),
        }
    }

    /// Validate the provider settings
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("Provider base URL cannot be empty".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("Provider timeout must be greater than 0".to_string());
        }
        if self.max_attempts == 0 {
            return Err("Provider attempts must be at least 1".to_string());
        }
        Ok(())
    }

    /// Retry policy for provider calls
    pub fn retry_policy(&self) -> RetryPolicy {
        let attempt_timeout = Duration::from_millis(self.request_timeout_ms);

        RetryPolicy::new(self.max_attempts)
            .with_attempt_timeout(attempt_timeout)
            .with_initial_delay(Duration::from_millis(self.initial_backoff_ms))
            .with_max_delay(Duration::from_millis(self.max_backoff_ms))
            .with_total_timeout(attempt_timeout * self.max_attempts as u32 * 2)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-4.1-mini".to_string(),
            request_timeout_ms: 60_000,
            max_attempts: 4,
            initial_backoff_ms: 500,
            max_backoff_ms: 20_000,
        }
    }
}

impl RagSettings {
    /// Load retrieval settings from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            chunk_size: env_or("RAG_CHUNK_SIZE", defaults.chunk_size),
            chunk_overlap: env_or("RAG_CHUNK_OVERLAP", defaults.chunk_overlap),
            top_k: env_or("RAG_TOP_K", defaults.top_k),
            embed_batch_size: env_or("EMBED_BATCH_SIZE", defaults.embed_batch_size),
            max_context_chars: env_or("RAG_MAX_CONTEXT_CHARS", defaults.max_context_chars),
        }
    }

    /// Validate the retrieval settings
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("Chunk size must be greater than 0".to_string());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.embed_batch_size == 0 {
            return Err("Embedding batch size must be greater than 0".to_string());
        }
        if self.max_context_chars == 0 {
            return Err("Context budget must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
            embed_batch_size: 96,
            max_context_chars: 12_000,
        }
    }
}
