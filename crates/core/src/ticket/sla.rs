//! SLA engine: due-time assignment and snapshot computation.
//!
//! Everything here is a pure function of ticket fields and a caller-supplied
//! `now`, so behavior is deterministic under test.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::{NewTicket, Priority, Ticket, TicketStatus};

/// Maximum allowed response time for a priority tier.
///
/// The mapping is total over the three valid priorities; validation of
/// caller-supplied priority strings happens at the API boundary.
pub fn sla_duration(priority: Priority) -> Duration {
    match priority {
        Priority::Low => Duration::hours(24),
        Priority::Medium => Duration::hours(8),
        Priority::High => Duration::hours(2),
    }
}

/// Point-in-time view of a ticket's SLA state.
///
/// Never persisted: recomputed from `(status, created_at, due_at)` on every
/// read, so it is only correct at the instant it was computed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlaSnapshot {
    /// Signed milliseconds until the deadline. Negative while breached.
    pub remaining_ms: i64,
    /// True when the deadline has passed and the ticket is still open.
    pub is_breached: bool,
    /// True whenever the ticket is not open (clock stopped).
    pub paused: bool,
}

impl SlaSnapshot {
    /// Compute the snapshot for a ticket as of `now`.
    ///
    /// While paused, `remaining_ms` reports the original allotted duration
    /// (`due_at - created_at`) rather than the time left at the pause
    /// instant. That matches the observed behavior of the system this
    /// replaces and is kept for compatibility.
    pub fn at(ticket: &Ticket, now: DateTime<Utc>) -> Self {
        if !ticket.status.is_open() {
            return Self {
                remaining_ms: ticket
                    .due_at
                    .signed_duration_since(ticket.created_at)
                    .num_milliseconds(),
                is_breached: false,
                paused: true,
            };
        }

        let remaining_ms = ticket.due_at.signed_duration_since(now).num_milliseconds();
        Self {
            remaining_ms,
            is_breached: remaining_ms <= 0,
            paused: false,
        }
    }
}

impl NewTicket {
    /// Build a new open ticket record, with `due_at` derived from `now` and
    /// the priority's SLA duration.
    ///
    /// `now` is captured once by the caller and reused verbatim as
    /// `created_at`, so `due_at - created_at` equals the SLA duration
    /// exactly, with no drift.
    pub fn open(title: impl Into<String>, priority: Priority, now: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            priority,
            status: TicketStatus::Open,
            created_at: now,
            due_at: now + sla_duration(priority),
        }
    }
}
