// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document upload and question-answering endpoints

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{
    delete_session_handler, list_sessions_handler, rag_chat_handler, upload_base64_handler,
    upload_pdf_handler,
};
pub use request::{Base64UploadRequest, RagChatRequest};
pub use response::{DeleteSessionResponse, RagChatResponse, UploadResponse};
