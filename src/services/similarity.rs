//! Bounded text similarity
//!
//! Thin wrapper over the `strsim` edit-distance ratio, with the empty
//! operand rule applied first: similarity against an empty string is 0.0
//! regardless of the other operand.

/// Symmetric similarity ratio in [0.0, 1.0] over already-normalized
/// strings. Identical non-empty strings score 1.0.
pub fn similarity(a: &str, b: &str) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b) as f32
}
