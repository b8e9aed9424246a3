// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide registry of uploaded documents
//!
//! Sessions live in memory only and disappear on restart. Readers clone the
//! `Arc<Session>` and drop the lock before searching, so a delete never waits
//! on an in-flight query; the index is freed once the last reader finishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::errors::{RagError, RagResult};
use super::vector_index::VectorIndex;

/// One uploaded document and its index
#[derive(Debug)]
pub struct Session {
    pub session_id: String,
    pub filename: String,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
    /// Monotonic creation order, breaks `created_at` ties
    sequence: u64,
    pub index: Arc<VectorIndex>,
}

impl Session {
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            filename: self.filename.clone(),
            chunk_count: self.chunk_count,
            created_at: self.created_at,
        }
    }
}

/// What session listings return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub filename: String,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    sequence: Arc<AtomicU64>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a populated index and return the new session's summary
    pub async fn create(
        &self,
        filename: &str,
        index: VectorIndex,
        chunk_count: usize,
    ) -> SessionSummary {
        let session_id = Uuid::new_v4().to_string();
        let session = Session {
            session_id: session_id.clone(),
            filename: filename.to_string(),
            chunk_count,
            created_at: Utc::now(),
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
            index: Arc::new(index),
        };
        let summary = session.summary();

        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.clone(), Arc::new(session));
        info!(
            "Created session {} for {} ({} chunks, {} active)",
            session_id,
            filename,
            chunk_count,
            sessions.len()
        );

        summary
    }

    pub async fn get(&self, session_id: &str) -> RagResult<Arc<Session>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| RagError::NotFound(session_id.to_string()))
    }

    /// All sessions, most recent first
    pub async fn list(&self) -> Vec<SessionSummary> {
        let mut sessions: Vec<Arc<Session>> = {
            let sessions = self.sessions.read().await;
            sessions.values().cloned().collect()
        };

        sessions.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        sessions.iter().map(|s| s.summary()).collect()
    }

    pub async fn delete(&self, session_id: &str) -> RagResult<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.remove(session_id) {
            Some(session) => {
                info!("Deleted session {} ({})", session_id, session.filename);
                Ok(())
            }
            None => Err(RagError::NotFound(session_id.to_string())),
        }
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
