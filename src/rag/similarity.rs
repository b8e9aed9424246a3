// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vector math for similarity search

pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity `dot(a, b) / (|a| * |b|)`
///
/// A zero vector on either side scores 0. Callers must pass vectors of equal
/// length; extra trailing components are ignored.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let magnitude_a = magnitude(a);
    let magnitude_b = magnitude(b);

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        0.0
    } else {
        dot_product(a, b) / (magnitude_a * magnitude_b)
    }
}
