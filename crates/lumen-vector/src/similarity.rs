//! Cosine similarity
//!
//! Author: hephaex@gmail.com

/// Cosine similarity between two vectors
///
/// Mismatched lengths, empty input and zero-magnitude vectors all score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x = f64::from(x);
        let y = f64::from(y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_vectors() {
        let v = vec![0.3, -0.2, 0.9];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_vectors() {
        let v = vec![1.0, 2.0];
        let w = vec![-1.0, -2.0];
        assert!((cosine_similarity(&v, &w) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        let zero = vec![0.0; 4];
        assert_eq!(cosine_similarity(&[1.0, 2.0, 3.0, 4.0], &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_dimension_mismatch_scores_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    proptest! {
        #[test]
        fn prop_self_similarity_is_one(v in prop::collection::vec(0.01f32..10.0, 1..128)) {
            prop_assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-5);
        }

        #[test]
        fn prop_bounded(
            a in prop::collection::vec(-10.0f32..10.0, 16),
            b in prop::collection::vec(-10.0f32..10.0, 16),
        ) {
            let score = cosine_similarity(&a, &b);
            prop_assert!((-1.0001..=1.0001).contains(&score));
        }
    }
}
