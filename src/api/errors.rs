// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use crate::rag::RagError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    NotFound(String),
    InvalidRequest(String),
    ValidationError {
        field: String,
        message: String,
    },
    UnsupportedMediaType(String),
    Unprocessable(String),
    /// Failure of the hosted model provider
    Upstream {
        code: &'static str,
        message: String,
    },
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg.clone(), None),
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::UnsupportedMediaType(msg) => ("unsupported_format", msg.clone(), None),
            ApiError::Unprocessable(msg) => ("extraction_failed", msg.clone(), None),
            ApiError::Upstream { code, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "code".to_string(),
                    serde_json::Value::String(code.to_string()),
                );
                ("upstream_error", message.clone(), Some(details))
            }
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::UnsupportedMediaType(_) => 415,
            ApiError::Unprocessable(_) => 422,
            ApiError::Upstream { .. } => 502,
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::UnsupportedMediaType(msg) => write!(f, "Unsupported media type: {}", msg),
            ApiError::Unprocessable(msg) => write!(f, "Unprocessable document: {}", msg),
            ApiError::Upstream { code, message } => write!(f, "Upstream error ({}): {}", code, message),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        let message = err.user_message();
        match err {
            RagError::InvalidArgument(_) => ApiError::InvalidRequest(message),
            RagError::UnsupportedFormat { .. } => ApiError::UnsupportedMediaType(message),
            RagError::NotFound(_) => ApiError::NotFound(message),
            RagError::ExtractionFailed { .. } => ApiError::Unprocessable(message),
            RagError::Retrieval { .. } | RagError::Upstream { .. } => {
                warn!("Provider failure: {}", err);
                ApiError::Upstream {
                    code: err.error_code(),
                    message,
                }
            }
            RagError::DimensionMismatch { .. } => {
                warn!("Index failure: {}", err);
                ApiError::InternalError(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}
