//! In-memory ticket table for pending add operations
//!
//! The table is the only shared mutable state in the workflow core. A
//! resume call *claims* (removes) an entry before doing any collaborator
//! I/O and restores it only when the transition turns out to be
//! recoverable, so two calls racing on the same ticket see exactly one
//! valid transition; the loser observes an unknown ticket. Operations on
//! different tickets only contend for the brief map-lock window.
//!
//! Expiry is opt-in: with no TTL configured, tickets live until they are
//! resumed to a terminal outcome.

use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{PendingOperation, PendingStep};

/// Ticket-keyed table of pending operations.
#[derive(Clone)]
pub struct TicketStore {
    inner: Arc<RwLock<HashMap<Uuid, PendingOperation>>>,
    ttl: Option<Duration>,
}

impl TicketStore {
    /// Create a store. `ttl_seconds = None` disables expiry.
    pub fn new(ttl_seconds: Option<u64>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl: ttl_seconds.map(|s| Duration::seconds(s as i64)),
        }
    }

    /// Insert a fresh pending operation and return its ticket.
    ///
    /// Expired entries are swept opportunistically on each insert.
    pub async fn create(&self, step: PendingStep) -> Uuid {
        let ticket = Uuid::new_v4();
        let operation = PendingOperation::new(step);

        let mut table = self.inner.write().await;
        if let Some(ttl) = self.ttl {
            table.retain(|swept, op| {
                let live = op.age() <= ttl;
                if !live {
                    tracing::info!(ticket = %swept, "Swept expired ticket");
                }
                live
            });
        }
        table.insert(ticket, operation);
        ticket
    }

    /// Remove and return the operation for `ticket`.
    ///
    /// Returns `None` for tickets that never existed, were already
    /// claimed, or have expired (an expired entry is dropped here).
    pub async fn claim(&self, ticket: Uuid) -> Option<PendingOperation> {
        let mut table = self.inner.write().await;
        let operation = table.remove(&ticket)?;
        if let Some(ttl) = self.ttl {
            if operation.age() > ttl {
                tracing::info!(ticket = %ticket, "Refused expired ticket");
                return None;
            }
        }
        Some(operation)
    }

    /// Put a claimed operation back, keeping its original ticket and
    /// creation time.
    pub async fn restore(&self, ticket: Uuid, operation: PendingOperation) {
        self.inner.write().await.insert(ticket, operation);
    }

    /// Number of live tickets (expired entries may still be counted
    /// until the next sweep).
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
