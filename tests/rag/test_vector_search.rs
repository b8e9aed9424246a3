// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Vector index search: ordering, clamping, dimension checks

use rag_chat_node::rag::{Chunk, RagError, VectorIndex};

fn chunks(n: usize) -> Vec<Chunk> {
    (0..n)
        .map(|i| Chunk {
            id: format!("chunk-{}", i),
            text: format!("text {}", i),
            source_offset: i * 5,
        })
        .collect()
}

#[test]
fn test_search_empty_index_returns_empty() {
    let index = VectorIndex::new();
    let results = index.search(&[0.1; 8], 5).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_search_identical_vector_scores_one() {
    let mut index = VectorIndex::new();
    index.insert(chunks(1), vec![vec![0.5; 16]]).unwrap();

    let results = index.search(&[0.5; 16], 5).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.id, "chunk-0");
    assert!(results[0].score > 0.99);
}

#[test]
fn test_search_sorted_by_score_descending() {
    let mut index = VectorIndex::new();
    let embeddings: Vec<Vec<f32>> = (0..6)
        .map(|i| vec![1.0, i as f32 * 0.4, 0.1])
        .collect();
    index.insert(chunks(6), embeddings).unwrap();

    let results = index.search(&[0.0, 1.0, 0.0], 6).unwrap();
    assert_eq!(results.len(), 6);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(results[0].chunk.id, "chunk-5");
}

#[test]
fn test_top_k_larger_than_index_is_clamped() {
    let mut index = VectorIndex::new();
    index
        .insert(chunks(2), vec![vec![1.0, 0.0], vec![0.0, 1.0]])
        .unwrap();

    let results = index.search(&[1.0, 1.0], 3).unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn test_ties_keep_insertion_order() {
    let mut index = VectorIndex::new();
    index
        .insert(chunks(3), vec![vec![0.6, 0.8], vec![0.6, 0.8], vec![0.6, 0.8]])
        .unwrap();

    let results = index.search(&[0.6, 0.8], 3).unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
    assert_eq!(ids, vec!["chunk-0", "chunk-1", "chunk-2"]);
}

#[test]
fn test_query_dimension_mismatch() {
    let mut index = VectorIndex::new();
    index.insert(chunks(1), vec![vec![1.0, 0.0, 0.0]]).unwrap();

    let result = index.search(&[1.0, 0.0], 1);
    assert!(matches!(
        result,
        Err(RagError::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    ));
}

#[test]
fn test_zero_vector_entry_scores_zero() {
    let mut index = VectorIndex::new();
    index
        .insert(chunks(2), vec![vec![0.0, 0.0], vec![1.0, 0.0]])
        .unwrap();

    let results = index.search(&[1.0, 0.0], 2).unwrap();
    assert_eq!(results[0].chunk.id, "chunk-1");
    assert_eq!(results[1].score, 0.0);
}

#[test]
fn test_stored_embedding_ranks_its_own_chunk_first() {
    let mut index = VectorIndex::new();
    let embeddings = vec![
        vec![0.9, 0.1, 0.3, 0.0],
        vec![0.1, 0.8, 0.0, 0.4],
        vec![0.2, 0.2, 0.9, 0.1],
        vec![0.0, 0.3, 0.1, 0.9],
    ];
    index.insert(chunks(4), embeddings.clone()).unwrap();

    for (i, embedding) in embeddings.iter().enumerate() {
        let results = index.search(embedding, 1).unwrap();
        assert_eq!(results[0].chunk.id, format!("chunk-{}", i));
    }
}

#[test]
fn test_insert_length_mismatch_is_invalid_argument() {
    let mut index = VectorIndex::new();
    let result = index.insert(chunks(2), vec![vec![1.0]]);
    assert!(matches!(result, Err(RagError::InvalidArgument(_))));
    assert!(index.is_empty());
}

#[test]
fn test_second_insert_must_match_dimension() {
    let mut index = VectorIndex::new();
    index.insert(chunks(1), vec![vec![1.0, 0.0]]).unwrap();

    let more = vec![Chunk {
        id: "chunk-9".to_string(),
        text: "late".to_string(),
        source_offset: 90,
    }];
    let result = index.insert(more, vec![vec![1.0, 0.0, 0.0]]);
    assert!(matches!(result, Err(RagError::DimensionMismatch { .. })));
    assert_eq!(index.len(), 1);
}
