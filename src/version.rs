// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the RAG chat node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-pdf-rag-2025-10-18";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-10-18";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "pdf-upload",
    "base64-upload",
    "session-vector-index",
    "cosine-search",
    "rag-chat",
    "streaming-chat",
    "provider-retry",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("RAG Chat Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
