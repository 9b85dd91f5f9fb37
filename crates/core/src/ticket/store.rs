//! Ticket storage trait and error type.

use thiserror::Error;

use crate::ticket::{NewTicket, Ticket, TicketId, TicketStatus};

/// Error type for ticket store operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Referenced ticket id does not exist.
    #[error("ticket not found: {0}")]
    NotFound(TicketId),

    /// The store failed to complete a durable operation.
    #[error("database error: {0}")]
    Database(String),
}

/// Trait for ticket storage backends.
///
/// The store assigns ids and never mutates creation fields after insert.
/// `update_status` must be atomic from the caller's perspective: a
/// concurrent read observes either the pre-update or post-update record.
pub trait TicketStore: Send + Sync {
    /// Persist a new ticket, assigning its id. Returns the full record.
    fn insert(&self, ticket: NewTicket) -> Result<Ticket, TicketError>;

    /// Get a ticket by id.
    fn get(&self, id: TicketId) -> Result<Option<Ticket>, TicketError>;

    /// List all tickets ordered by ascending id.
    fn list_all(&self) -> Result<Vec<Ticket>, TicketError>;

    /// Set a ticket's status and return the updated record.
    fn update_status(&self, id: TicketId, status: TicketStatus) -> Result<Ticket, TicketError>;
}
