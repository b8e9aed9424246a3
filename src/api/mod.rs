// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod chat;
pub mod errors;
pub mod http_server;
pub mod rag;

pub use chat::{chat_handler, ChatRequest, ChatResponse};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState, HealthResponse};
pub use rag::{
    Base64UploadRequest, DeleteSessionResponse, RagChatRequest, RagChatResponse, UploadResponse,
};
