// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chat API request types

use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::providers::{ChatMessage, CompletionRequest};

/// Request body for POST /api/chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Instruction for the assistant (sent with the developer role)
    pub developer_message: String,

    /// Message from the user
    pub user_message: String,

    /// Chat model (server default when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Stream the answer as plain text (default true)
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_stream() -> bool {
    true
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.user_message.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "user_message".to_string(),
                message: "user_message cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Provider request using `default_model` when no model was given
    pub fn to_completion(&self, default_model: &str) -> CompletionRequest {
        CompletionRequest {
            model: self
                .model
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| default_model.to_string()),
            messages: vec![
                ChatMessage::developer(self.developer_message.clone()),
                ChatMessage::user(self.user_message.clone()),
            ],
        }
    }
}
