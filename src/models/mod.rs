//! Data models for cd-catalog

pub mod candidate;
pub mod operation;

pub use candidate::{Candidate, RankedCandidate, ReleaseDetail};
pub use operation::{
    confirm_options, ChoiceSummary, PendingOperation, PendingStep, ResumeOutcome, StartOutcome,
    UserReply,
};
