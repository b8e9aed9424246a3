// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! General chat endpoint handler

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::TryStreamExt;
use tracing::{debug, warn};

use super::request::ChatRequest;
use super::response::ChatResponse;
use crate::api::http_server::AppState;
use crate::api::ApiError;
use crate::rag::RagError;

/// POST /api/chat - Chat with the hosted model
///
/// With `stream: true` (the default) the answer is sent as `text/plain`,
/// one fragment at a time as the provider produces it. A client that
/// disconnects drops the stream and ends the provider request.
///
/// # Errors
/// - 400 Bad Request: empty user message
/// - 502 Bad Gateway: provider failed before the first fragment
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;

    let completion = request.to_completion(state.chat.default_model());
    debug!(
        "Chat request: model={}, stream={}",
        completion.model, request.stream
    );

    let completion = &completion;
    let chat = state.chat.as_ref();

    if request.stream {
        let fragments = state
            .retry
            .run(move || chat.stream(completion))
            .await
            .map_err(|e| RagError::upstream("chat", e))?;

        let body = Body::from_stream(fragments.inspect_err(|e| {
            warn!("Chat stream ended with error: {}", e);
        }));

        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response())
    } else {
        let content = state
            .retry
            .run(move || chat.complete(completion))
            .await
            .map_err(|e| RagError::upstream("chat", e))?;

        Ok(Json(ChatResponse {
            content,
            model: completion.model.clone(),
        })
        .into_response())
    }
}
