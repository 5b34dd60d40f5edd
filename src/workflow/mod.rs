//! Resumable confirmation workflow

pub mod addition;
pub mod ticket_store;

pub use addition::{AdditionWorkflow, WorkflowError, WorkflowSettings};
pub use ticket_store::TicketStore;
