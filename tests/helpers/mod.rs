//! Shared test fixtures: in-memory collaborator fakes and builders
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use cd_catalog::models::{Candidate, ReleaseDetail, ResumeOutcome, StartOutcome};
use cd_catalog::types::{CatalogError, CollectionStore, ReleaseCatalog, StoreError};
use uuid::Uuid;

pub fn candidate(
    id: u64,
    artist: &str,
    title: &str,
    year: Option<u16>,
    formats: &[&str],
) -> Candidate {
    Candidate {
        id,
        title: title.to_string(),
        artist: artist.to_string(),
        year,
        country: Some("UK".to_string()),
        label: Some("Test Label".to_string()),
        formats: formats.iter().map(|f| f.to_string()).collect(),
    }
}

/// Detail derived from a candidate, the way a catalogue lookup would
/// resolve it.
pub fn detail_for(candidate: &Candidate) -> ReleaseDetail {
    ReleaseDetail {
        discogs_id: candidate.id,
        title: candidate.title.clone(),
        artist: candidate.artist.clone(),
        year: candidate.year,
        labels: candidate.label.iter().cloned().collect(),
        formats: candidate.formats.clone(),
        tracklist: vec!["Track 1".to_string(), "Track 2".to_string()],
        country: candidate.country.clone(),
        genres: vec!["Rock".to_string()],
        styles: vec![],
        images: vec![],
    }
}

/// The three-candidate set used by the end-to-end scenarios: an exact
/// "OK Computer" (1997, CD) among plausible near-misses.
pub fn radiohead_candidates() -> Vec<Candidate> {
    vec![
        candidate(101, "Radiohead", "Kid A", Some(2000), &["CD", "Album"]),
        candidate(102, "Radiohead", "OK Computer", Some(1997), &["CD", "Album"]),
        candidate(
            103,
            "Radiohead",
            "OK Computer OKNOTOK 1997 2017",
            Some(2017),
            &["Vinyl", "LP"],
        ),
    ]
}

/// In-memory release catalogue with call counters.
pub struct FakeCatalog {
    pub candidates: Vec<Candidate>,
    pub fail_detail: AtomicBool,
    pub search_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            fail_detail: AtomicBool::new(false),
            search_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

#[async_trait::async_trait]
impl ReleaseCatalog for FakeCatalog {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<Candidate>, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.iter().take(limit).cloned().collect())
    }

    async fn fetch_detail(&self, id: u64) -> Result<ReleaseDetail, CatalogError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_detail.load(Ordering::SeqCst) {
            return Err(CatalogError::Network("connection reset".to_string()));
        }
        self.candidates
            .iter()
            .find(|c| c.id == id)
            .map(detail_for)
            .ok_or(CatalogError::NotFound(id))
    }
}

/// In-memory collection store with switchable failure modes.
pub struct FakeStore {
    pub duplicate: AtomicBool,
    pub fail_duplicate_check: AtomicBool,
    pub fail_append: AtomicBool,
    pub appended: Mutex<Vec<ReleaseDetail>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            duplicate: AtomicBool::new(false),
            fail_duplicate_check: AtomicBool::new(false),
            fail_append: AtomicBool::new(false),
            appended: Mutex::new(vec![]),
        }
    }

    pub fn append_count(&self) -> usize {
        self.appended.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl CollectionStore for FakeStore {
    async fn is_duplicate(&self, _detail: &ReleaseDetail) -> Result<bool, StoreError> {
        if self.fail_duplicate_check.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(self.duplicate.load(Ordering::SeqCst))
    }

    async fn append(&self, detail: &ReleaseDetail) -> Result<(), StoreError> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        self.appended.lock().unwrap().push(detail.clone());
        Ok(())
    }
}

pub fn ticket_of_start(outcome: &StartOutcome) -> Uuid {
    match outcome {
        StartOutcome::AwaitingChoice { ticket, .. } => *ticket,
        StartOutcome::NeedConfirmation { ticket, .. } => *ticket,
        StartOutcome::NoResults { .. } => panic!("no ticket in NoResults"),
    }
}

pub fn choices_of_start(outcome: &StartOutcome) -> Vec<(u64, String)> {
    match outcome {
        StartOutcome::AwaitingChoice { choices, .. } => choices
            .iter()
            .map(|c| (c.id, c.summary.clone()))
            .collect(),
        other => panic!("expected AwaitingChoice, got {:?}", other),
    }
}

pub fn pick_reply(release_id: u64) -> cd_catalog::models::UserReply {
    cd_catalog::models::UserReply {
        release_id: Some(release_id),
        confirm: None,
    }
}

pub fn confirm_reply(confirm: &str) -> cd_catalog::models::UserReply {
    cd_catalog::models::UserReply {
        release_id: None,
        confirm: Some(confirm.to_string()),
    }
}

pub fn assert_need_confirmation(outcome: &ResumeOutcome) {
    assert!(
        matches!(outcome, ResumeOutcome::NeedConfirmation { .. }),
        "expected NeedConfirmation, got {:?}",
        outcome
    );
}
