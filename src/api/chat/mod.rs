// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! General chat endpoint (no retrieval)

pub mod handler;
pub mod request;
pub mod response;

pub use handler::chat_handler;
pub use request::ChatRequest;
pub use response::ChatResponse;
