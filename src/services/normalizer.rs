//! Text normalization for comparison
//!
//! Canonicalizes free-text strings before similarity scoring so that
//! case, spacing, and punctuation differences don't affect ranking.

/// Normalize a string for comparison: lowercase, trim, collapse runs of
/// whitespace to a single space, then strip everything that is not a
/// word character or whitespace.
///
/// Empty or whitespace-only input normalizes to the empty string.
pub fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == ' ')
        .collect()
}
