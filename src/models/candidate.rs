//! Release metadata models
//!
//! `Candidate` is the lightweight shape returned by catalogue search;
//! `ReleaseDetail` is the fully resolved metadata fetched only after a
//! human has confirmed a choice.

use serde::{Deserialize, Serialize};

/// One search result from the external release catalogue, not yet fully detailed.
///
/// Produced exclusively by the catalogue client, which owns the conversion
/// from upstream response shapes. Everything downstream treats this as
/// read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Catalogue release id
    pub id: u64,
    /// Release title
    pub title: String,
    /// Artist display name (may be empty if the catalogue gave none)
    pub artist: String,
    /// Release year (if known)
    pub year: Option<u16>,
    /// Release country (if known)
    pub country: Option<String>,
    /// Label names, comma-joined (if known)
    pub label: Option<String>,
    /// Format names (e.g. "CD", "Vinyl")
    pub formats: Vec<String>,
}

impl Candidate {
    /// Human-readable one-line summary for choice lists and confirmation
    /// prompts. Callers never see the raw candidate in a prompt.
    pub fn summary(&self) -> String {
        let year = self
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "?".to_string());
        if self.artist.is_empty() {
            format!("{} ({}) [{}]", self.title, year, self.formats.join(", "))
        } else {
            format!(
                "{} - {} ({}) [{}]",
                self.artist,
                self.title,
                year,
                self.formats.join(", ")
            )
        }
    }
}

/// A candidate plus its composite relevance score.
///
/// Ordering is descending by score; ties keep the catalogue's original
/// relative order (the ranker uses a stable sort).
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    /// Composite relevance score (0.0-1.0)
    pub score: f32,
}

impl RankedCandidate {
    pub fn summary(&self) -> String {
        self.candidate.summary()
    }
}

/// Fully resolved metadata for one chosen release.
///
/// Fetched lazily after confirmation. Detail calls are never made for
/// unchosen candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseDetail {
    /// Catalogue release id
    pub discogs_id: u64,
    pub title: String,
    pub artist: String,
    pub year: Option<u16>,
    pub labels: Vec<String>,
    pub formats: Vec<String>,
    pub tracklist: Vec<String>,
    pub country: Option<String>,
    pub genres: Vec<String>,
    pub styles: Vec<String>,
    pub images: Vec<String>,
}

impl ReleaseDetail {
    /// One-line summary for result messages.
    pub fn summary(&self) -> String {
        let year = self
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "?".to_string());
        format!("{} - {} ({})", self.artist, self.title, year)
    }
}
