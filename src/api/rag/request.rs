// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! RAG API request types

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Request body for POST /api/rag/upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Base64UploadRequest {
    /// Base64-encoded document bytes
    pub file: String,

    /// Original filename (default "document.pdf")
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_filename() -> String {
    "document.pdf".to_string()
}

impl Base64UploadRequest {
    /// Decode the document bytes
    pub fn decode(&self) -> Result<Vec<u8>, ApiError> {
        if self.file.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "file".to_string(),
                message: "No file data provided".to_string(),
            });
        }

        STANDARD
            .decode(self.file.trim())
            .map_err(|e| ApiError::ValidationError {
                field: "file".to_string(),
                message: format!("Invalid base64 data: {}", e),
            })
    }
}

/// Request body for POST /api/rag/chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagChatRequest {
    /// Session returned by an upload
    pub session_id: String,

    /// Question about the document
    pub user_message: String,

    /// Chat model override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Number of chunks to retrieve (server default when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

impl RagChatRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.session_id.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "session_id".to_string(),
                message: "session_id cannot be empty".to_string(),
            });
        }
        if self.user_message.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "user_message".to_string(),
                message: "user_message cannot be empty".to_string(),
            });
        }
        if self.top_k == Some(0) {
            return Err(ApiError::ValidationError {
                field: "top_k".to_string(),
                message: "top_k must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
