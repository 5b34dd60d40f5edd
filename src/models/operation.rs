//! Pending operation and workflow outcome types
//!
//! A `PendingOperation` is the unit of durable state for one in-flight
//! add request, keyed by an opaque ticket. The workflow suspends at each
//! human-facing step by returning an outcome to the caller; the pending
//! operation is the only state carried between invocations.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Candidate, RankedCandidate};

/// The step a pending operation is suspended at.
///
/// Encoded as a tagged variant so the candidate list only exists while a
/// pick is pending and the selected release only exists while a
/// confirmation is pending. There is no representable invalid step.
#[derive(Debug, Clone)]
pub enum PendingStep {
    /// Waiting for the user to pick one of the ranked candidates.
    AwaitingPick {
        query: String,
        candidates: Vec<RankedCandidate>,
    },
    /// Waiting for the user to confirm adding the selected release.
    AwaitingConfirm { query: String, selected: Candidate },
}

/// One in-flight add operation.
#[derive(Debug, Clone)]
pub struct PendingOperation {
    pub step: PendingStep,
    pub created_at: DateTime<Utc>,
}

impl PendingOperation {
    pub fn new(step: PendingStep) -> Self {
        Self {
            step,
            created_at: Utc::now(),
        }
    }

    /// Wall-clock age of this operation, for optional expiry.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }
}

/// One entry in a choice list presented to the user.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceSummary {
    /// Catalogue release id to send back as `release_id`
    pub id: u64,
    /// Human-readable summary (artist, title, year, formats)
    pub summary: String,
}

/// Outcome of `begin`: either no results, or a suspension at one of the
/// two human-facing steps.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartOutcome {
    /// Upstream search returned nothing; no ticket was created.
    NoResults { message: String },
    /// Waiting for the user to pick a candidate.
    #[serde(rename = "awaiting_user_choice")]
    AwaitingChoice {
        ticket: Uuid,
        message: String,
        choices: Vec<ChoiceSummary>,
    },
    /// Auto-confirm selected the top candidate; waiting for yes/no.
    #[serde(rename = "need_user_confirmation")]
    NeedConfirmation {
        ticket: Uuid,
        message: String,
        options: Vec<String>,
    },
}

/// Outcome of `resume`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResumeOutcome {
    /// Pick accepted; waiting for yes/no on the selected release.
    #[serde(rename = "need_user_confirmation")]
    NeedConfirmation {
        ticket: Uuid,
        message: String,
        options: Vec<String>,
    },
    /// Missing or non-matching `release_id`. Recoverable: the ticket is
    /// preserved so the caller can retry with a valid id.
    #[serde(rename = "error")]
    InvalidSelection { message: String },
    /// User declined; ticket deleted.
    Cancelled { message: String },
    /// An equivalent entry already exists; nothing was appended.
    Duplicate { message: String },
    /// Release appended to the collection; ticket deleted.
    Completed { message: String },
    /// A collaborator call failed during commit. When `retryable` the
    /// ticket was restored and the confirmation can be resent.
    Failed { message: String, retryable: bool },
}

/// User input carried by a resume call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserReply {
    /// Candidate id, expected while a pick is pending
    pub release_id: Option<u64>,
    /// Confirmation string ("yes"/"y" is affirmative), expected while a
    /// confirmation is pending
    pub confirm: Option<String>,
}

/// The two options offered at the confirmation step.
pub fn confirm_options() -> Vec<String> {
    vec!["yes".to_string(), "no".to_string()]
}
