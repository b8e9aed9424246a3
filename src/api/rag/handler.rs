// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! RAG API endpoint handlers

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Multipart;
use tracing::{debug, info, warn};

use super::request::{Base64UploadRequest, RagChatRequest};
use super::response::{DeleteSessionResponse, RagChatResponse, UploadResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;
use crate::rag::SessionSummary;

/// POST /api/upload_pdf - Upload a PDF as multipart form data
///
/// # Request
/// - `file`: form field carrying the filename and PDF bytes
///
/// # Errors
/// - 400 Bad Request: missing `file` field, missing filename or empty file
/// - 415 Unsupported Media Type: filename does not end in `.pdf`
/// - 422 Unprocessable Entity: no text could be extracted
/// - 502 Bad Gateway: embedding provider failed
pub async fn upload_pdf_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => {
                return Err(ApiError::ValidationError {
                    field: "file".to_string(),
                    message: "Multipart field 'file' must carry a filename".to_string(),
                })
            }
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to read upload: {}", e)))?;

        debug!("Received multipart upload {} ({} bytes)", filename, bytes.len());
        let summary = state.ingestor.ingest(&filename, bytes.to_vec()).await?;
        info!("Uploaded {} as session {}", filename, summary.session_id);
        return Ok(Json(UploadResponse::from(summary)));
    }

    Err(ApiError::ValidationError {
        field: "file".to_string(),
        message: "Multipart field 'file' is required".to_string(),
    })
}

/// POST /api/rag/upload - Upload a base64-encoded PDF
pub async fn upload_base64_handler(
    State(state): State<AppState>,
    Json(request): Json<Base64UploadRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
    let bytes = request.decode()?;
    debug!(
        "Received base64 upload {} ({} bytes)",
        request.filename,
        bytes.len()
    );

    let summary = state.ingestor.ingest(&request.filename, bytes).await?;
    info!(
        "Uploaded {} as session {}",
        request.filename, summary.session_id
    );
    Ok(Json(UploadResponse::from(summary)))
}

/// POST /api/rag/chat - Ask a question about an uploaded document
pub async fn rag_chat_handler(
    State(state): State<AppState>,
    Json(request): Json<RagChatRequest>,
) -> Result<Json<RagChatResponse>, ApiError> {
    if let Err(e) = request.validate() {
        warn!("RAG chat validation failed: {}", e);
        return Err(e);
    }

    let top_k = request.top_k.unwrap_or(state.config.rag.top_k);
    let answer = state
        .orchestrator
        .answer_with_model(
            &request.session_id,
            &request.user_message,
            top_k,
            request.model.as_deref(),
        )
        .await?;

    Ok(Json(RagChatResponse::from(answer)))
}

/// GET /api/rag/sessions - List sessions, most recent first
pub async fn list_sessions_handler(State(state): State<AppState>) -> Json<Vec<SessionSummary>> {
    Json(state.sessions.list().await)
}

/// DELETE /api/rag/sessions/:session_id
pub async fn delete_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<DeleteSessionResponse>, ApiError> {
    state.sessions.delete(&session_id).await?;

    Ok(Json(DeleteSessionResponse {
        deleted: true,
        session_id,
    }))
}
