// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Errors returned by hosted model providers

use thiserror::Error;

/// Errors that can occur when calling an embedding or chat provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Rate limited by the provider
    #[error("Rate limited by provider (retry after {retry_after_secs:?}s)")]
    RateLimited {
        /// Seconds to wait before retrying, if the provider said so
        retry_after_secs: Option<u64>,
    },

    /// Non-success HTTP status from the provider
    #[error("Provider API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body or message
        message: String,
    },

    /// Request did not complete in time
    #[error("Provider request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Connection or protocol failure before a response was read
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be understood
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// No API key configured
    #[error("No API key configured for {provider}")]
    MissingApiKey {
        /// Name of the provider missing an API key
        provider: String,
    },
}

impl ProviderError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. } => true,
            ProviderError::Timeout { .. } => true,
            ProviderError::Transport(_) => true,
            ProviderError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Server-suggested delay, if any
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_secs } => *retry_after_secs,
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout { timeout_ms }
        } else if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}
