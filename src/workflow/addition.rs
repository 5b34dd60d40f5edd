//! Add-to-collection confirmation workflow
//!
//! Sequences "search, user picks, duplicate check, commit" across
//! independent invocations, suspending at each human-facing step. Each
//! suspension is a full return to the caller carrying a ticket; no task
//! blocks waiting for input, and arbitrary time may pass between calls.
//!
//! State progression per ticket:
//! AWAITING_PICK -> AWAITING_CONFIRM -> (completed | cancelled | duplicate)
//!
//! Terminal outcomes are represented by ticket deletion, not by a stored
//! state. `auto_confirm` skips straight to AWAITING_CONFIRM with the
//! top-ranked candidate. The expensive detail fetch happens only after
//! an affirmative confirmation, never for unchosen or rejected
//! candidates.

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{
    confirm_options, ChoiceSummary, PendingOperation, PendingStep, ResumeOutcome, StartOutcome,
    UserReply,
};
use crate::services::ReleaseRanker;
use crate::types::{CatalogError, CollectionStore, ReleaseCatalog};
use crate::workflow::TicketStore;

/// Workflow errors surfaced across the API boundary.
///
/// Everything the user can recover from within a live ticket (bad pick,
/// failed commit) is a `ResumeOutcome`, not an error.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The ticket never existed, was already resumed to a terminal
    /// outcome, or expired. Not recoverable by retrying the same ticket.
    #[error("Unknown ticket: {0}")]
    UnknownTicket(Uuid),

    /// Catalogue search failed before any ticket was created.
    #[error("Catalogue error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Tunables for the workflow, resolved from [`Config`].
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// Upper bound on search candidates fetched per `begin`
    pub search_limit: usize,
    /// Penalize non-CD formats when ranking
    pub require_cd: bool,
    /// Optional maximum ticket age; `None` disables expiry
    pub ticket_ttl_seconds: Option<u64>,
    /// Restore the ticket when a collaborator fails mid-commit, so the
    /// confirmation can be retried. When false the ticket is dropped and
    /// the failure is terminal.
    pub preserve_ticket_on_failure: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            search_limit: 5,
            require_cd: true,
            ticket_ttl_seconds: None,
            preserve_ticket_on_failure: true,
        }
    }
}

impl From<&Config> for WorkflowSettings {
    fn from(config: &Config) -> Self {
        Self {
            search_limit: config.search_limit,
            require_cd: config.require_cd,
            ticket_ttl_seconds: config.ticket_ttl_seconds,
            preserve_ticket_on_failure: config.preserve_ticket_on_failure,
        }
    }
}

/// The confirmation workflow over the ticket table.
pub struct AdditionWorkflow {
    catalog: Arc<dyn ReleaseCatalog>,
    store: Arc<dyn CollectionStore>,
    ranker: ReleaseRanker,
    tickets: TicketStore,
    search_limit: usize,
    require_cd: bool,
    preserve_ticket_on_failure: bool,
}

impl AdditionWorkflow {
    pub fn new(
        catalog: Arc<dyn ReleaseCatalog>,
        store: Arc<dyn CollectionStore>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            catalog,
            store,
            ranker: ReleaseRanker::new(),
            tickets: TicketStore::new(settings.ticket_ttl_seconds),
            search_limit: settings.search_limit.max(1),
            require_cd: settings.require_cd,
            preserve_ticket_on_failure: settings.preserve_ticket_on_failure,
        }
    }

    /// Number of in-flight add operations.
    pub async fn pending_count(&self) -> usize {
        self.tickets.len().await
    }

    /// Start an add operation: search the catalogue, rank the results,
    /// and suspend at the first human-facing step.
    pub async fn begin(
        &self,
        query: &str,
        auto_confirm: bool,
    ) -> Result<StartOutcome, WorkflowError> {
        let candidates = self.catalog.search(query, self.search_limit).await?;

        if candidates.is_empty() {
            tracing::info!(query = %query, "Catalogue search returned no candidates");
            return Ok(StartOutcome::NoResults {
                message: "No results found on Discogs.".to_string(),
            });
        }

        let ranked = self.ranker.rank(query, candidates, self.require_cd);

        if auto_confirm {
            // ranked is non-empty here; take the top candidate directly
            let top = ranked[0].candidate.clone();
            let summary = top.summary();
            let ticket = self
                .tickets
                .create(PendingStep::AwaitingConfirm {
                    query: query.to_string(),
                    selected: top,
                })
                .await;

            tracing::info!(ticket = %ticket, query = %query, "Auto-selected top candidate");

            return Ok(StartOutcome::NeedConfirmation {
                ticket,
                message: format!("Auto-selected: {summary}\n\nAdd this CD to your collection?"),
                options: confirm_options(),
            });
        }

        let choices: Vec<ChoiceSummary> = ranked
            .iter()
            .map(|r| ChoiceSummary {
                id: r.candidate.id,
                summary: r.summary(),
            })
            .collect();

        let ticket = self
            .tickets
            .create(PendingStep::AwaitingPick {
                query: query.to_string(),
                candidates: ranked,
            })
            .await;

        tracing::info!(
            ticket = %ticket,
            query = %query,
            choices = choices.len(),
            "Awaiting user choice"
        );

        Ok(StartOutcome::AwaitingChoice {
            ticket,
            message: "Select the correct CD from the list.".to_string(),
            choices,
        })
    }

    /// Resume a suspended add operation with the user's input.
    ///
    /// The pending entry is claimed up front, so concurrent resumes on
    /// the same ticket serialize: exactly one observes each transition
    /// and the rest see `UnknownTicket`.
    pub async fn resume(
        &self,
        ticket: Uuid,
        reply: &UserReply,
    ) -> Result<ResumeOutcome, WorkflowError> {
        let operation = self
            .tickets
            .claim(ticket)
            .await
            .ok_or(WorkflowError::UnknownTicket(ticket))?;
        let created_at = operation.created_at;

        match operation.step {
            PendingStep::AwaitingPick { query, candidates } => {
                let chosen = reply
                    .release_id
                    .and_then(|id| candidates.iter().find(|r| r.candidate.id == id))
                    .map(|r| r.candidate.clone());

                let Some(selected) = chosen else {
                    let message = if reply.release_id.is_none() {
                        "No release selected.".to_string()
                    } else {
                        "Invalid release ID.".to_string()
                    };
                    tracing::info!(ticket = %ticket, "Selection rejected, ticket preserved");
                    // Recoverable: put the untouched pick state back.
                    self.tickets
                        .restore(
                            ticket,
                            PendingOperation {
                                step: PendingStep::AwaitingPick { query, candidates },
                                created_at,
                            },
                        )
                        .await;
                    return Ok(ResumeOutcome::InvalidSelection { message });
                };

                let summary = selected.summary();
                self.tickets
                    .restore(
                        ticket,
                        PendingOperation {
                            step: PendingStep::AwaitingConfirm { query, selected },
                            created_at,
                        },
                    )
                    .await;

                tracing::info!(ticket = %ticket, release = %summary, "User picked a release");

                Ok(ResumeOutcome::NeedConfirmation {
                    ticket,
                    message: format!("You selected: {summary}\n\nAdd to collection?"),
                    options: confirm_options(),
                })
            }

            PendingStep::AwaitingConfirm { query, selected } => {
                let confirm = reply
                    .confirm
                    .as_deref()
                    .unwrap_or("")
                    .trim()
                    .to_lowercase();
                if confirm != "yes" && confirm != "y" {
                    // Claim already deleted the ticket; this is terminal.
                    tracing::info!(ticket = %ticket, "Cancelled by user");
                    return Ok(ResumeOutcome::Cancelled {
                        message: "Cancelled by user.".to_string(),
                    });
                }

                self.commit(ticket, created_at, query, selected).await
            }
        }
    }

    /// Confirmed path: fetch detail (deferred to exactly this point),
    /// check for duplicates, append. Collaborator failures restore the
    /// ticket when configured to, so a confirmed add is never silently
    /// dropped.
    async fn commit(
        &self,
        ticket: Uuid,
        created_at: chrono::DateTime<chrono::Utc>,
        query: String,
        selected: crate::models::Candidate,
    ) -> Result<ResumeOutcome, WorkflowError> {
        let release_id = selected.id;

        let detail = match self.catalog.fetch_detail(release_id).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(ticket = %ticket, release_id, error = %e, "Detail fetch failed");
                return Ok(self
                    .commit_failure(ticket, created_at, query, selected, e.to_string())
                    .await);
            }
        };

        let duplicate = match self.store.is_duplicate(&detail).await {
            Ok(duplicate) => duplicate,
            Err(e) => {
                tracing::warn!(ticket = %ticket, release_id, error = %e, "Duplicate check failed");
                return Ok(self
                    .commit_failure(ticket, created_at, query, selected, e.to_string())
                    .await);
            }
        };

        if duplicate {
            tracing::info!(ticket = %ticket, release_id, "Release already in collection");
            return Ok(ResumeOutcome::Duplicate {
                message: format!("'{}' is already in the collection.", detail.summary()),
            });
        }

        if let Err(e) = self.store.append(&detail).await {
            tracing::warn!(ticket = %ticket, release_id, error = %e, "Append failed");
            return Ok(self
                .commit_failure(ticket, created_at, query, selected, e.to_string())
                .await);
        }

        tracing::info!(
            ticket = %ticket,
            release_id,
            query = %query,
            title = %detail.title,
            "Release added to collection"
        );

        Ok(ResumeOutcome::Completed {
            message: format!("Added: {}", detail.summary()),
        })
    }

    async fn commit_failure(
        &self,
        ticket: Uuid,
        created_at: chrono::DateTime<chrono::Utc>,
        query: String,
        selected: crate::models::Candidate,
        error: String,
    ) -> ResumeOutcome {
        if self.preserve_ticket_on_failure {
            self.tickets
                .restore(
                    ticket,
                    PendingOperation {
                        step: PendingStep::AwaitingConfirm { query, selected },
                        created_at,
                    },
                )
                .await;
            ResumeOutcome::Failed {
                message: format!("Could not complete the addition: {error}. Resend the confirmation to retry."),
                retryable: true,
            }
        } else {
            ResumeOutcome::Failed {
                message: format!("Could not complete the addition: {error}."),
                retryable: false,
            }
        }
    }
}
