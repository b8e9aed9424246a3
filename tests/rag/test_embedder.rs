// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Embedder client: batching, ordering and retry behaviour

use crate::common::{embedder, letter_embedding, FakeEmbeddings, PoisonedEmbeddings, ScriptedEmbeddings};
use async_trait::async_trait;
use rag_chat_node::api::ApiError;
use rag_chat_node::providers::{EmbeddingProvider, ProviderError};
use rag_chat_node::rag::{EmbedderClient, RagError};
use std::error::Error;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

fn texts(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("text number {}", i)).collect()
}

#[tokio::test]
async fn test_sub_batches_respect_max_size_and_keep_order() {
    let provider = Arc::new(FakeEmbeddings::new());
    let client = embedder(provider.clone(), 4);
    let input = texts(10);

    let vectors = client.embed_batch(&input).await.unwrap();

    assert_eq!(provider.batch_sizes(), vec![4, 4, 2]);
    assert_eq!(vectors.len(), 10);
    for (text, vector) in input.iter().zip(&vectors) {
        assert_eq!(vector, &letter_embedding(text));
    }
}

#[tokio::test]
async fn test_empty_input_makes_no_calls() {
    let provider = Arc::new(FakeEmbeddings::new());
    let client = embedder(provider.clone(), 4);

    assert!(client.embed_batch(&[]).await.unwrap().is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let provider = Arc::new(ScriptedEmbeddings::new(vec![
        ProviderError::RateLimited {
            retry_after_secs: None,
        },
        ProviderError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        },
    ]));
    let client = embedder(provider.clone(), 8);

    let vectors = client.embed_batch(&texts(3)).await.unwrap();
    assert_eq!(vectors.len(), 3);
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_non_retryable_error_fails_on_first_attempt() {
    let provider = Arc::new(ScriptedEmbeddings::new(vec![ProviderError::Api {
        status: 401,
        message: "invalid api key".to_string(),
    }]));
    let client = embedder(provider.clone(), 8);

    let err = client.embed_batch(&texts(3)).await.unwrap_err();
    assert_eq!(provider.calls(), 1);
    match err {
        RagError::Retrieval { start, end, source } => {
            assert_eq!((start, end), (0, 3));
            assert!(matches!(*source, RagError::Upstream { attempts: 1, .. }));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_exhausted_retries_report_failed_range() {
    let mut input = texts(10);
    input[5] = "poison".to_string();
    let provider = Arc::new(PoisonedEmbeddings {
        poison: "poison".to_string(),
        calls: AtomicUsize::new(0),
    });
    let client = embedder(provider.clone(), 4);

    let err = client.embed_batch(&input).await.unwrap_err();

    assert!(matches!(err, RagError::Retrieval { start: 4, end: 8, .. }));
    let upstream = err.source().unwrap().to_string();
    assert!(upstream.contains("3 attempt(s)"), "{}", upstream);
    // first batch once, second batch three times, third never
    assert_eq!(provider.calls.load(std::sync::atomic::Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_zero_batch_size_rejected() {
    let result = EmbedderClient::new(
        Arc::new(FakeEmbeddings::new()),
        0,
        crate::common::fast_retry(),
    );
    assert!(matches!(result, Err(RagError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_embed_one() {
    let client = embedder(Arc::new(FakeEmbeddings::new()), 4);
    let vector = client.embed_one("abc").await.unwrap();
    assert_eq!(vector, letter_embedding("abc"));
}

/// Provider that answers with a NaN component in every vector
struct NonFiniteEmbeddings;

#[async_trait]
impl EmbeddingProvider for NonFiniteEmbeddings {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts.iter().map(|_| vec![1.0, f32::NAN]).collect())
    }

    fn embedding_model(&self) -> &str {
        "nan-embedding"
    }

    fn name(&self) -> &'static str {
        "nan"
    }
}

#[tokio::test]
async fn test_non_finite_vectors_are_an_upstream_fault() {
    let client = embedder(Arc::new(NonFiniteEmbeddings), 4);

    let err = client.embed_batch(&texts(2)).await.unwrap_err();
    match &err {
        RagError::Retrieval { start, end, source } => {
            assert_eq!((*start, *end), (0, 2));
            assert!(source.to_string().contains("NaN"), "{}", source);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(ApiError::from(err).status_code(), 502);
}
