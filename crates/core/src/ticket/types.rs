//! Core ticket data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ticket identifier, assigned by the store at insert time.
///
/// Ids are strictly increasing, so ascending-id order is also creation order.
pub type TicketId = i64;

/// Priority tier of a ticket. Determines the SLA duration.
///
/// Immutable after creation: there is no update path for priority, which is
/// what keeps `due_at` valid for the lifetime of the ticket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Parse a priority from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    /// Returns the priority as a string (for storage and filtering).
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Current status of a ticket.
///
/// There is no enforced transition graph: any status is reachable from any
/// other via the status-update operation. A resolved ticket may be reopened
/// and an open ticket may jump straight to resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
}

impl TicketStatus {
    /// Parse a status from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(TicketStatus::Open),
            "in_progress" => Some(TicketStatus::InProgress),
            "resolved" => Some(TicketStatus::Resolved),
            _ => None,
        }
    }

    /// Returns the status as a string (for storage and filtering).
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
        }
    }

    /// Returns true if the SLA clock is running for this status.
    pub fn is_open(&self) -> bool {
        matches!(self, TicketStatus::Open)
    }
}

/// A persisted support ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    /// Unique identifier (store-assigned, strictly increasing).
    pub id: TicketId,

    /// Short description of the issue. Immutable after creation.
    pub title: String,

    /// Priority tier. Immutable after creation.
    pub priority: Priority,

    /// Current status. Starts at `Open`.
    pub status: TicketStatus,

    /// When the ticket was created.
    pub created_at: DateTime<Utc>,

    /// SLA deadline: `created_at + sla_duration(priority)`. Immutable.
    pub due_at: DateTime<Utc>,
}

/// A ticket record ready to be persisted, before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub title: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse_round_trip() {
        for p in [Priority::Low, Priority::Medium, Priority::High] {
            assert_eq!(Priority::parse(p.as_str()), Some(p));
        }
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(Priority::parse(""), None);
        assert_eq!(Priority::parse("High"), None);
    }

    #[test]
    fn test_status_parse_round_trip() {
        for s in [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
        ] {
            assert_eq!(TicketStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(TicketStatus::parse("closed"), None);
        assert_eq!(TicketStatus::parse("in-progress"), None);
    }

    #[test]
    fn test_status_is_open() {
        assert!(TicketStatus::Open.is_open());
        assert!(!TicketStatus::InProgress.is_open());
        assert!(!TicketStatus::Resolved.is_open());
    }

    #[test]
    fn test_priority_serialization() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), r#""high""#);
        let p: Priority = serde_json::from_str(r#""medium""#).unwrap();
        assert_eq!(p, Priority::Medium);
    }

    #[test]
    fn test_status_serialization_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            r#""in_progress""#
        );
        let s: TicketStatus = serde_json::from_str(r#""in_progress""#).unwrap();
        assert_eq!(s, TicketStatus::InProgress);
    }
}
