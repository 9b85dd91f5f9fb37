//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use super::{NewTicket, Priority, Ticket, TicketError, TicketId, TicketStatus, TicketStore};

const TICKET_COLUMNS: &str = "id, title, priority, status, created_at, due_at";

/// SQLite-backed ticket store.
///
/// Ids come from `INTEGER PRIMARY KEY AUTOINCREMENT`, which gives the
/// strictly increasing ordering the listing operation relies on. All access
/// goes through a single mutex-guarded connection, so each operation is
/// atomic from the caller's perspective.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path).map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                priority TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                due_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
            "#,
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        debug!("Ticket schema initialized");
        Ok(())
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        let id: TicketId = row.get(0)?;
        let title: String = row.get(1)?;
        let priority_str: String = row.get(2)?;
        let status_str: String = row.get(3)?;
        let created_at_str: String = row.get(4)?;
        let due_at_str: String = row.get(5)?;

        let priority = Priority::parse(&priority_str)
            .ok_or_else(|| parse_failure(2, format!("unknown priority: {}", priority_str)))?;
        let status = TicketStatus::parse(&status_str)
            .ok_or_else(|| parse_failure(3, format!("unknown status: {}", status_str)))?;
        let created_at = parse_timestamp(4, &created_at_str)?;
        let due_at = parse_timestamp(5, &due_at_str)?;

        Ok(Ticket {
            id,
            title,
            priority,
            status,
            created_at,
            due_at,
        })
    }
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| parse_failure(idx, e.to_string()))
}

fn parse_failure(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
}

impl TicketStore for SqliteTicketStore {
    fn insert(&self, ticket: NewTicket) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO tickets (title, priority, status, created_at, due_at) VALUES (?, ?, ?, ?, ?)",
            params![
                ticket.title,
                ticket.priority.as_str(),
                ticket.status.as_str(),
                ticket.created_at.to_rfc3339(),
                ticket.due_at.to_rfc3339(),
            ],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        let id = conn.last_insert_rowid();

        Ok(Ticket {
            id,
            title: ticket.title,
            priority: ticket.priority,
            status: ticket.status,
            created_at: ticket.created_at,
            due_at: ticket.due_at,
        })
    }

    fn get(&self, id: TicketId) -> Result<Option<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            &format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS),
            params![id],
            Self::row_to_ticket,
        );

        match result {
            Ok(ticket) => Ok(Some(ticket)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TicketError::Database(e.to_string())),
        }
    }

    fn list_all(&self) -> Result<Vec<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM tickets ORDER BY id ASC",
                TICKET_COLUMNS
            ))
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_ticket)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let mut tickets = Vec::new();
        for row_result in rows {
            let ticket = row_result.map_err(|e| TicketError::Database(e.to_string()))?;
            tickets.push(ticket);
        }

        Ok(tickets)
    }

    fn update_status(&self, id: TicketId, status: TicketStatus) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        let changed = conn
            .execute(
                "UPDATE tickets SET status = ? WHERE id = ?",
                params![status.as_str(), id],
            )
            .map_err(|e| TicketError::Database(e.to_string()))?;

        if changed == 0 {
            return Err(TicketError::NotFound(id));
        }

        conn.query_row(
            &format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS),
            params![id],
            Self::row_to_ticket,
        )
        .map_err(|e| TicketError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_store() -> SqliteTicketStore {
        SqliteTicketStore::in_memory().unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn new_ticket(title: &str, priority: Priority) -> NewTicket {
        NewTicket::open(title, priority, t0())
    }

    #[test]
    fn test_insert_assigns_id_and_stores_fields_verbatim() {
        let store = create_test_store();
        let new = new_ticket("Server down", Priority::High);

        let ticket = store.insert(new.clone()).unwrap();

        assert!(ticket.id > 0);
        assert_eq!(ticket.title, new.title);
        assert_eq!(ticket.priority, new.priority);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.created_at, new.created_at);
        assert_eq!(ticket.due_at, new.due_at);
    }

    #[test]
    fn test_insert_ids_are_strictly_increasing() {
        let store = create_test_store();

        let a = store.insert(new_ticket("first", Priority::Low)).unwrap();
        let b = store.insert(new_ticket("second", Priority::Medium)).unwrap();
        let c = store.insert(new_ticket("third", Priority::High)).unwrap();

        assert!(a.id < b.id);
        assert!(b.id < c.id);
    }

    #[test]
    fn test_get_round_trips_timestamps() {
        let store = create_test_store();
        let created = store.insert(new_ticket("Printer jam", Priority::Low)).unwrap();

        let fetched = store.get(created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_get_nonexistent_ticket() {
        let store = create_test_store();
        let result = store.get(9999).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_list_all_ordered_by_ascending_id() {
        let store = create_test_store();

        for i in 0..5 {
            store
                .insert(new_ticket(&format!("ticket {}", i), Priority::Medium))
                .unwrap();
        }

        let tickets = store.list_all().unwrap();
        assert_eq!(tickets.len(), 5);
        for pair in tickets.windows(2) {
            assert!(pair[0].id < pair[1].id);
        }
    }

    #[test]
    fn test_list_order_unaffected_by_status_updates() {
        let store = create_test_store();

        let a = store.insert(new_ticket("a", Priority::Low)).unwrap();
        let b = store.insert(new_ticket("b", Priority::High)).unwrap();

        // Touching the older ticket must not move it in the listing.
        store.update_status(a.id, TicketStatus::Resolved).unwrap();

        let tickets = store.list_all().unwrap();
        assert_eq!(tickets[0].id, a.id);
        assert_eq!(tickets[1].id, b.id);
    }

    #[test]
    fn test_update_status_persists() {
        let store = create_test_store();
        let ticket = store.insert(new_ticket("Flaky VPN", Priority::Medium)).unwrap();

        let updated = store
            .update_status(ticket.id, TicketStatus::InProgress)
            .unwrap();
        assert_eq!(updated.status, TicketStatus::InProgress);

        let fetched = store.get(ticket.id).unwrap().unwrap();
        assert_eq!(fetched.status, TicketStatus::InProgress);
    }

    #[test]
    fn test_update_status_leaves_creation_fields_untouched() {
        let store = create_test_store();
        let ticket = store.insert(new_ticket("Disk full", Priority::High)).unwrap();

        let updated = store
            .update_status(ticket.id, TicketStatus::Resolved)
            .unwrap();

        assert_eq!(updated.title, ticket.title);
        assert_eq!(updated.priority, ticket.priority);
        assert_eq!(updated.created_at, ticket.created_at);
        assert_eq!(updated.due_at, ticket.due_at);
    }

    #[test]
    fn test_update_status_allows_any_transition() {
        let store = create_test_store();
        let ticket = store.insert(new_ticket("reopen me", Priority::Low)).unwrap();

        // Straight to resolved, then back to open: no transition graph.
        store.update_status(ticket.id, TicketStatus::Resolved).unwrap();
        let reopened = store.update_status(ticket.id, TicketStatus::Open).unwrap();
        assert_eq!(reopened.status, TicketStatus::Open);
    }

    #[test]
    fn test_update_status_nonexistent_ticket() {
        let store = create_test_store();
        let result = store.update_status(9999, TicketStatus::Resolved);
        assert!(matches!(result, Err(TicketError::NotFound(9999))));
    }

    #[test]
    fn test_file_based_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("tickets.db");

        let store = SqliteTicketStore::new(&db_path).unwrap();
        let ticket = store.insert(new_ticket("persisted", Priority::Low)).unwrap();

        assert!(db_path.exists());

        let fetched = store.get(ticket.id).unwrap();
        assert!(fetched.is_some());
    }
}
