//! Candidate ranking
//!
//! Scores catalogue candidates against a free-text query and returns
//! them sorted best-first. Pure function over its inputs: no I/O, no
//! randomness, no time dependence.
//!
//! Composite score per candidate (weights sum to 1.0):
//! - title similarity (0.45)
//! - artist similarity (0.25), with an `artist - title` query split
//! - year proximity (0.15), linear decay to zero at a 10-year gap
//! - CD format bonus (0.15)

use crate::models::{Candidate, RankedCandidate};
use crate::services::normalizer::normalize;
use crate::services::similarity::similarity;

const TITLE_WEIGHT: f32 = 0.45;
const ARTIST_WEIGHT: f32 = 0.25;
const YEAR_WEIGHT: f32 = 0.15;
const FORMAT_WEIGHT: f32 = 0.15;

/// Score multiplier for non-CD candidates when CD format is required.
/// A penalty, not an exclusion: a strong non-CD match can still surface.
const NON_CD_PENALTY: f32 = 0.5;

/// Candidate ranker.
///
/// Stateless; construct once and share freely.
#[derive(Debug, Clone, Default)]
pub struct ReleaseRanker;

impl ReleaseRanker {
    pub fn new() -> Self {
        Self
    }

    /// Score and sort candidates, highest first.
    ///
    /// An empty query degrades gracefully (title/artist terms go to
    /// zero); an empty candidate list returns an empty vector. Ties keep
    /// the catalogue's original relative order.
    pub fn rank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        require_cd: bool,
    ) -> Vec<RankedCandidate> {
        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .map(|candidate| {
                let mut score = self.score_candidate(query, &candidate);
                if require_cd && !has_cd_format(&candidate) {
                    score *= NON_CD_PENALTY;
                }
                RankedCandidate { candidate, score }
            })
            .collect();

        // sort_by is stable: equal scores preserve upstream order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(
            query = %query,
            candidates = ranked.len(),
            top_score = ?ranked.first().map(|r| r.score),
            "Ranked catalogue candidates"
        );

        ranked
    }

    /// Composite relevance score for one candidate (0.0-1.0).
    fn score_candidate(&self, query: &str, candidate: &Candidate) -> f32 {
        let query_norm = normalize(query);
        let title_norm = normalize(&candidate.title);
        let artist_norm = normalize(&candidate.artist);

        let title_sim = similarity(&query_norm, &title_norm);

        // An explicit "artist - title" delimiter in the query makes the
        // artist term trustworthy; otherwise it is heavily down-weighted.
        let artist_sim = match query.split_once('-') {
            Some((artist_part, title_part)) => {
                0.9 * similarity(&normalize(artist_part), &artist_norm)
                    + 0.1 * similarity(&normalize(title_part), &title_norm)
            }
            None => 0.2 * similarity(&query_norm, &artist_norm),
        };

        let year_score = match (extract_year(query), candidate.year) {
            (Some(query_year), Some(candidate_year)) => {
                let diff = (i32::from(query_year) - i32::from(candidate_year))
                    .unsigned_abs()
                    .min(10);
                1.0 - diff as f32 / 10.0
            }
            _ => 0.0,
        };

        let format_score = if has_cd_format(candidate) { 1.0 } else { 0.0 };

        TITLE_WEIGHT * title_sim
            + ARTIST_WEIGHT * artist_sim
            + YEAR_WEIGHT * year_score
            + FORMAT_WEIGHT * format_score
    }
}

/// Whether any of the candidate's formats looks like a CD.
fn has_cd_format(candidate: &Candidate) -> bool {
    candidate
        .formats
        .iter()
        .map(|f| normalize(f))
        .any(|f| f.contains("cd") || f.contains("compact disc"))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Extract the first standalone 4-digit year token in 1900-2099 from the
/// raw (un-normalized) query.
fn extract_year(raw: &str) -> Option<u16> {
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if i - start != 4 {
            continue;
        }
        // Word boundaries on both sides, like \b(19|20)\d{2}\b
        let left_ok = start == 0 || !is_word_char(chars[start - 1]);
        let right_ok = i == chars.len() || !is_word_char(chars[i]);
        if !left_ok || !right_ok {
            continue;
        }
        let token: String = chars[start..i].iter().collect();
        if let Ok(year) = token.parse::<u16>() {
            if (1900..=2099).contains(&year) {
                return Some(year);
            }
        }
    }
    None
}
