//! Confirmation workflow integration tests
//!
//! Exercises the full begin/resume lifecycle against in-memory
//! collaborator fakes: candidate ranking on entry, ticket suspension and
//! claiming, the deferred detail fetch, duplicate rejection, and commit.

mod helpers;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use cd_catalog::models::{ResumeOutcome, StartOutcome};
use cd_catalog::workflow::{AdditionWorkflow, WorkflowError, WorkflowSettings};
use helpers::*;
use uuid::Uuid;

fn workflow_with(
    catalog: &Arc<FakeCatalog>,
    store: &Arc<FakeStore>,
    settings: WorkflowSettings,
) -> AdditionWorkflow {
    AdditionWorkflow::new(catalog.clone(), store.clone(), settings)
}

fn default_workflow(catalog: &Arc<FakeCatalog>, store: &Arc<FakeStore>) -> AdditionWorkflow {
    workflow_with(catalog, store, WorkflowSettings::default())
}

#[tokio::test]
async fn begin_with_no_results_creates_no_ticket() {
    let catalog = Arc::new(FakeCatalog::empty());
    let store = Arc::new(FakeStore::new());
    let workflow = default_workflow(&catalog, &store);

    let outcome = workflow.begin("Unknown Band - Unknown Album", false).await.unwrap();
    assert!(matches!(outcome, StartOutcome::NoResults { .. }));
    assert_eq!(workflow.pending_count().await, 0);
}

#[tokio::test]
async fn begin_ranks_exact_match_first() {
    // Scenario A: three candidates including an exact "OK Computer"
    // (1997, CD) - it must surface as the first choice.
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    let workflow = default_workflow(&catalog, &store);

    let outcome = workflow
        .begin("Radiohead - OK Computer 1997", false)
        .await
        .unwrap();

    let choices = choices_of_start(&outcome);
    assert_eq!(choices.len(), 3);
    assert_eq!(choices[0].0, 102);
    assert!(choices[0].1.contains("OK Computer"));
    assert!(choices[0].1.contains("1997"));
    assert_eq!(workflow.pending_count().await, 1);
    // No expensive detail calls at the search stage.
    assert_eq!(catalog.detail_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pick_transitions_to_confirmation_without_detail_fetch() {
    // Scenario B: resume with the top choice id.
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    let workflow = default_workflow(&catalog, &store);

    let start = workflow.begin("Radiohead - OK Computer 1997", false).await.unwrap();
    let ticket = ticket_of_start(&start);

    let outcome = workflow.resume(ticket, &pick_reply(102)).await.unwrap();
    assert_need_confirmation(&outcome);

    // Still suspended; the detail fetch is deferred until after "yes".
    assert_eq!(workflow.pending_count().await, 1);
    assert_eq!(catalog.detail_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_rejection_deletes_ticket_without_append() {
    // Scenario C: confirmed, but the store already has the release.
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    store.duplicate.store(true, Ordering::SeqCst);
    let workflow = default_workflow(&catalog, &store);

    let start = workflow.begin("Radiohead - OK Computer 1997", false).await.unwrap();
    let ticket = ticket_of_start(&start);
    workflow.resume(ticket, &pick_reply(102)).await.unwrap();

    let outcome = workflow.resume(ticket, &confirm_reply("yes")).await.unwrap();
    assert!(matches!(outcome, ResumeOutcome::Duplicate { .. }));
    assert_eq!(store.append_count(), 0);

    // Terminal: the ticket is gone.
    let err = workflow.resume(ticket, &confirm_reply("yes")).await.unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownTicket(_)));
}

#[tokio::test]
async fn commit_appends_fetched_detail_once_and_deletes_ticket() {
    // Scenario D: the full happy path.
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    let workflow = default_workflow(&catalog, &store);

    let start = workflow.begin("Radiohead - OK Computer 1997", false).await.unwrap();
    let ticket = ticket_of_start(&start);
    workflow.resume(ticket, &pick_reply(102)).await.unwrap();

    let outcome = workflow.resume(ticket, &confirm_reply("yes")).await.unwrap();
    assert!(matches!(outcome, ResumeOutcome::Completed { .. }));

    assert_eq!(catalog.detail_calls.load(Ordering::SeqCst), 1);
    let appended = store.appended.lock().unwrap();
    assert_eq!(appended.len(), 1);
    assert_eq!(appended[0].discogs_id, 102);
    assert_eq!(appended[0].title, "OK Computer");
    drop(appended);

    assert_eq!(workflow.pending_count().await, 0);
}

#[tokio::test]
async fn second_confirm_cannot_double_commit() {
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    let workflow = default_workflow(&catalog, &store);

    let start = workflow.begin("Radiohead - OK Computer 1997", false).await.unwrap();
    let ticket = ticket_of_start(&start);
    workflow.resume(ticket, &pick_reply(102)).await.unwrap();

    let first = workflow.resume(ticket, &confirm_reply("yes")).await.unwrap();
    assert!(matches!(first, ResumeOutcome::Completed { .. }));

    let second = workflow.resume(ticket, &confirm_reply("yes")).await;
    assert!(matches!(second, Err(WorkflowError::UnknownTicket(_))));
    assert_eq!(store.append_count(), 1);
}

#[tokio::test]
async fn racing_confirms_serialize_to_one_winner() {
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    let workflow = Arc::new(default_workflow(&catalog, &store));

    let start = workflow.begin("Radiohead - OK Computer 1997", true).await.unwrap();
    let ticket = ticket_of_start(&start);

    let reply_a = confirm_reply("yes");
    let reply_b = confirm_reply("yes");
    let (a, b) = tokio::join!(
        workflow.resume(ticket, &reply_a),
        workflow.resume(ticket, &reply_b),
    );

    let completions = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Ok(ResumeOutcome::Completed { .. })))
        .count();
    let unknown = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Err(WorkflowError::UnknownTicket(_))))
        .count();

    assert_eq!(completions, 1, "exactly one resume must commit: {:?} {:?}", a, b);
    assert_eq!(unknown, 1, "the loser must see an unknown ticket: {:?} {:?}", a, b);
    assert_eq!(store.append_count(), 1);
}

#[tokio::test]
async fn auto_confirm_skips_the_pick_step() {
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    let workflow = default_workflow(&catalog, &store);

    let start = workflow.begin("Radiohead - OK Computer 1997", true).await.unwrap();
    let ticket = match &start {
        StartOutcome::NeedConfirmation { ticket, message, options } => {
            assert!(message.contains("OK Computer"));
            assert_eq!(options, &["yes", "no"]);
            *ticket
        }
        other => panic!("expected NeedConfirmation, got {:?}", other),
    };

    // "y" counts as affirmative, case-insensitively.
    let outcome = workflow.resume(ticket, &confirm_reply("Y")).await.unwrap();
    assert!(matches!(outcome, ResumeOutcome::Completed { .. }));
    assert_eq!(store.append_count(), 1);
}

#[tokio::test]
async fn non_affirmative_confirmation_cancels() {
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    let workflow = default_workflow(&catalog, &store);

    let start = workflow.begin("Radiohead - OK Computer 1997", true).await.unwrap();
    let ticket = ticket_of_start(&start);

    let outcome = workflow.resume(ticket, &confirm_reply("no")).await.unwrap();
    assert!(matches!(outcome, ResumeOutcome::Cancelled { .. }));
    assert_eq!(store.append_count(), 0);
    assert_eq!(catalog.detail_calls.load(Ordering::SeqCst), 0);

    // Cancellation is terminal for the ticket.
    let err = workflow.resume(ticket, &confirm_reply("yes")).await.unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownTicket(_)));
}

#[tokio::test]
async fn invalid_selection_preserves_the_ticket() {
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    let workflow = default_workflow(&catalog, &store);

    let start = workflow.begin("Radiohead - OK Computer 1997", false).await.unwrap();
    let ticket = ticket_of_start(&start);

    // Missing id
    let outcome = workflow
        .resume(ticket, &cd_catalog::models::UserReply::default())
        .await
        .unwrap();
    assert!(matches!(outcome, ResumeOutcome::InvalidSelection { .. }));

    // Non-matching id
    let outcome = workflow.resume(ticket, &pick_reply(999)).await.unwrap();
    assert!(matches!(outcome, ResumeOutcome::InvalidSelection { .. }));

    // The caller can still retry with a valid id.
    let outcome = workflow.resume(ticket, &pick_reply(101)).await.unwrap();
    assert_need_confirmation(&outcome);
}

#[tokio::test]
async fn resume_on_never_issued_ticket_fails() {
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    let workflow = default_workflow(&catalog, &store);

    let err = workflow
        .resume(Uuid::new_v4(), &confirm_reply("yes"))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownTicket(_)));
}

#[tokio::test]
async fn commit_failure_restores_ticket_for_retry() {
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    store.fail_append.store(true, Ordering::SeqCst);
    let workflow = default_workflow(&catalog, &store);

    let start = workflow.begin("Radiohead - OK Computer 1997", true).await.unwrap();
    let ticket = ticket_of_start(&start);

    let outcome = workflow.resume(ticket, &confirm_reply("yes")).await.unwrap();
    assert!(matches!(outcome, ResumeOutcome::Failed { retryable: true, .. }));
    assert_eq!(store.append_count(), 0);

    // Store recovers; the same ticket can be confirmed again.
    store.fail_append.store(false, Ordering::SeqCst);
    let outcome = workflow.resume(ticket, &confirm_reply("yes")).await.unwrap();
    assert!(matches!(outcome, ResumeOutcome::Completed { .. }));
    assert_eq!(store.append_count(), 1);
}

#[tokio::test]
async fn detail_fetch_failure_restores_ticket_for_retry() {
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    catalog.fail_detail.store(true, Ordering::SeqCst);
    let store = Arc::new(FakeStore::new());
    let workflow = default_workflow(&catalog, &store);

    let start = workflow.begin("Radiohead - OK Computer 1997", true).await.unwrap();
    let ticket = ticket_of_start(&start);

    let outcome = workflow.resume(ticket, &confirm_reply("yes")).await.unwrap();
    assert!(matches!(outcome, ResumeOutcome::Failed { retryable: true, .. }));

    catalog.fail_detail.store(false, Ordering::SeqCst);
    let outcome = workflow.resume(ticket, &confirm_reply("yes")).await.unwrap();
    assert!(matches!(outcome, ResumeOutcome::Completed { .. }));
}

#[tokio::test]
async fn commit_failure_without_preservation_is_terminal() {
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    store.fail_duplicate_check.store(true, Ordering::SeqCst);
    let workflow = workflow_with(
        &catalog,
        &store,
        WorkflowSettings {
            preserve_ticket_on_failure: false,
            ..WorkflowSettings::default()
        },
    );

    let start = workflow.begin("Radiohead - OK Computer 1997", true).await.unwrap();
    let ticket = ticket_of_start(&start);

    let outcome = workflow.resume(ticket, &confirm_reply("yes")).await.unwrap();
    assert!(matches!(outcome, ResumeOutcome::Failed { retryable: false, .. }));

    let err = workflow.resume(ticket, &confirm_reply("yes")).await.unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownTicket(_)));
}

#[tokio::test]
async fn tickets_expire_under_configured_ttl() {
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    let workflow = workflow_with(
        &catalog,
        &store,
        WorkflowSettings {
            ticket_ttl_seconds: Some(0),
            ..WorkflowSettings::default()
        },
    );

    let start = workflow.begin("Radiohead - OK Computer 1997", true).await.unwrap();
    let ticket = ticket_of_start(&start);

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let err = workflow.resume(ticket, &confirm_reply("yes")).await.unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownTicket(_)));
}

#[tokio::test]
async fn independent_operations_do_not_interfere() {
    let catalog = Arc::new(FakeCatalog::new(radiohead_candidates()));
    let store = Arc::new(FakeStore::new());
    let workflow = default_workflow(&catalog, &store);

    let first = workflow.begin("Radiohead - OK Computer 1997", false).await.unwrap();
    let second = workflow.begin("Radiohead - Kid A", false).await.unwrap();
    let first_ticket = ticket_of_start(&first);
    let second_ticket = ticket_of_start(&second);
    assert_ne!(first_ticket, second_ticket);
    assert_eq!(workflow.pending_count().await, 2);

    // Cancelling one leaves the other resumable.
    workflow.resume(first_ticket, &pick_reply(102)).await.unwrap();
    let outcome = workflow.resume(first_ticket, &confirm_reply("no")).await.unwrap();
    assert!(matches!(outcome, ResumeOutcome::Cancelled { .. }));

    let outcome = workflow.resume(second_ticket, &pick_reply(101)).await.unwrap();
    assert_need_confirmation(&outcome);
}
