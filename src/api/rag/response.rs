// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! RAG API response types

use serde::{Deserialize, Serialize};

use crate::rag::{RagAnswer, SessionSummary};

/// Response body for both upload endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub filename: String,
    pub chunk_count: usize,
    pub message: String,
}

impl From<SessionSummary> for UploadResponse {
    fn from(summary: SessionSummary) -> Self {
        Self {
            message: format!(
                "PDF '{}' uploaded and indexed successfully",
                summary.filename
            ),
            session_id: summary.session_id,
            filename: summary.filename,
            chunk_count: summary.chunk_count,
        }
    }
}

/// Response body for POST /api/rag/chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagChatResponse {
    pub answer: String,
    pub relevant_chunks_used: usize,
    pub filename: String,
    pub session_id: String,
}

impl From<RagAnswer> for RagChatResponse {
    fn from(answer: RagAnswer) -> Self {
        Self {
            answer: answer.answer,
            relevant_chunks_used: answer.relevant_chunks_used,
            filename: answer.filename,
            session_id: answer.session_id,
        }
    }
}

/// Response body for DELETE /api/rag/sessions/:session_id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSessionResponse {
    pub deleted: bool,
    pub session_id: String,
}
