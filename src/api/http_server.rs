// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::chat::chat_handler;
use super::rag::{
    delete_session_handler, list_sessions_handler, rag_chat_handler, upload_base64_handler,
    upload_pdf_handler,
};
use crate::config::NodeConfig;
use crate::providers::{ChatProvider, EmbeddingProvider, RetryPolicy};
use crate::rag::{
    Chunker, DocumentIngestor, EmbedderClient, RagResult, RetrievalOrchestrator, SessionStore,
    TextExtractor,
};
use crate::version;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub ingestor: Arc<DocumentIngestor>,
    pub orchestrator: Arc<RetrievalOrchestrator>,
    pub chat: Arc<dyn ChatProvider>,
    pub retry: RetryPolicy,
    pub config: Arc<NodeConfig>,
    pub api_key_set: bool,
}

impl AppState {
    /// Wire the retrieval core from configuration and providers
    pub fn new(
        config: NodeConfig,
        embeddings: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatProvider>,
        extractor: Arc<dyn TextExtractor>,
        api_key_set: bool,
    ) -> RagResult<Self> {
        let retry = config.provider.retry_policy();
        let sessions = SessionStore::new();
        let chunker = Chunker::new(config.rag.chunk_size, config.rag.chunk_overlap)?;
        let embedder = EmbedderClient::new(embeddings, config.rag.embed_batch_size, retry.clone())?;

        let ingestor = DocumentIngestor::new(extractor, chunker, embedder.clone(), sessions.clone());
        let orchestrator = RetrievalOrchestrator::new(
            sessions.clone(),
            embedder,
            chat.clone(),
            retry.clone(),
            config.rag.max_context_chars,
        );

        Ok(Self {
            sessions,
            ingestor: Arc::new(ingestor),
            orchestrator: Arc::new(orchestrator),
            chat,
            retry,
            config: Arc::new(config),
            api_key_set,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub api_key_set: bool,
    pub version: String,
    pub sessions: usize,
    /// Build tag, date and feature list
    pub build: serde_json::Value,
}

/// Build the router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        // Health check
        .route("/api/health", get(health_handler))
        // General chat
        .route("/api/chat", post(chat_handler))
        // Document upload
        .route("/api/upload_pdf", post(upload_pdf_handler))
        .route("/api/rag/upload", post(upload_base64_handler))
        // Question answering and sessions
        .route("/api/rag/chat", post(rag_chat_handler))
        .route("/api/rag/sessions", get(list_sessions_handler))
        .route("/api/rag/sessions/:session_id", delete(delete_session_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

pub async fn start_server(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", state.config.host, state.config.port).parse::<SocketAddr>()?;
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        api_key_set: state.api_key_set,
        version: version::VERSION_NUMBER.to_string(),
        sessions: state.sessions.len().await,
        build: version::get_version_info(),
    })
}
