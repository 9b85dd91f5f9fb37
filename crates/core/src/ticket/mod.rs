//! Ticket system: domain types, SLA engine, and storage.

mod sla;
mod sqlite_store;
mod store;
mod types;

pub use sla::{sla_duration, SlaSnapshot};
pub use sqlite_store::SqliteTicketStore;
pub use store::{TicketError, TicketStore};
pub use types::{NewTicket, Priority, Ticket, TicketId, TicketStatus};
