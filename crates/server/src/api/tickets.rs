//! Ticket API handlers.
//!
//! Validation is fail-fast and checked before any store call, first
//! violation wins. Timestamps go out as RFC 3339 strings; the SLA snapshot
//! is computed fresh at the instant of each read and never persisted.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use sladesk_core::{
    NewTicket, Priority, SlaSnapshot, Ticket, TicketError, TicketId, TicketStatus,
};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket.
///
/// Fields are optional so that missing vs. invalid values produce distinct
/// validation messages instead of a generic decode rejection.
#[derive(Debug, Deserialize)]
pub struct CreateTicketBody {
    pub title: Option<String>,
    pub priority: Option<String>,
}

/// Request body for updating a ticket's status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub id: Option<TicketId>,
    pub status: Option<String>,
}

/// A ticket as it appears on the wire
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: TicketId,
    pub title: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub created_at: String,
    pub due_at: String,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title,
            priority: ticket.priority,
            status: ticket.status,
            created_at: ticket.created_at.to_rfc3339(),
            due_at: ticket.due_at.to_rfc3339(),
        }
    }
}

/// A ticket annotated with its live SLA snapshot
#[derive(Debug, Serialize)]
pub struct TicketWithSlaResponse {
    #[serde(flatten)]
    pub ticket: TicketResponse,
    pub sla: SlaSnapshot,
}

impl TicketWithSlaResponse {
    fn at(ticket: Ticket, now: chrono::DateTime<Utc>) -> Self {
        let sla = SlaSnapshot::at(&ticket, now);
        Self {
            ticket: TicketResponse::from(ticket),
            sla,
        }
    }
}

/// Response for create/update operations
#[derive(Debug, Serialize)]
pub struct TicketMessageResponse {
    pub message: String,
    pub ticket: TicketResponse,
}

/// Response for listing tickets
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    pub tickets: Vec<TicketWithSlaResponse>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn validation_error(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}

fn store_error(e: TicketError) -> ApiError {
    let status = match e {
        TicketError::NotFound(_) => StatusCode::NOT_FOUND,
        TicketError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            message: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketBody>,
) -> Result<(StatusCode, Json<TicketMessageResponse>), ApiError> {
    let title = match body.title {
        Some(ref t) if !t.trim().is_empty() => t.clone(),
        _ => return Err(validation_error("title required")),
    };

    let priority = match body.priority {
        Some(ref p) => match Priority::parse(p) {
            Some(priority) => priority,
            None => return Err(validation_error("invalid priority")),
        },
        None => return Err(validation_error("priority required")),
    };

    // Capture the creation instant once: it is both created_at and the base
    // for due_at, so the two can never drift apart.
    let new_ticket = NewTicket::open(title, priority, Utc::now());
    let ticket = state
        .ticket_store()
        .insert(new_ticket)
        .map_err(store_error)?;

    info!(
        ticket_id = ticket.id,
        priority = priority.as_str(),
        due_at = %ticket.due_at,
        "Ticket created"
    );

    Ok((
        StatusCode::CREATED,
        Json(TicketMessageResponse {
            message: "Ticket created".to_string(),
            ticket: TicketResponse::from(ticket),
        }),
    ))
}

/// List all tickets with live SLA snapshots, ordered by ascending id
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListTicketsResponse>, ApiError> {
    let tickets = state.ticket_store().list_all().map_err(store_error)?;

    // One instant for the whole listing, so all snapshots agree on "now".
    let now = Utc::now();
    let tickets = tickets
        .into_iter()
        .map(|t| TicketWithSlaResponse::at(t, now))
        .collect();

    Ok(Json(ListTicketsResponse { tickets }))
}

/// Get a ticket by id with its live SLA snapshot
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TicketId>,
) -> Result<Json<TicketWithSlaResponse>, ApiError> {
    match state.ticket_store().get(id) {
        Ok(Some(ticket)) => Ok(Json(TicketWithSlaResponse::at(ticket, Utc::now()))),
        Ok(None) => Err(store_error(TicketError::NotFound(id))),
        Err(e) => Err(store_error(e)),
    }
}

/// Update a ticket's status
///
/// Any valid status is accepted regardless of the current one: there is no
/// transition graph, so resolving straight from open or reopening a resolved
/// ticket are both allowed. Leaving `open` pauses the SLA clock on the next
/// read; nothing else is recomputed here.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<TicketMessageResponse>, ApiError> {
    let (id, status_str) = match (body.id, body.status) {
        (Some(id), Some(status)) => (id, status),
        _ => return Err(validation_error("id and status required")),
    };

    let status = match TicketStatus::parse(&status_str) {
        Some(status) => status,
        None => return Err(validation_error("invalid status")),
    };

    let ticket = state
        .ticket_store()
        .update_status(id, status)
        .map_err(store_error)?;

    info!(ticket_id = ticket.id, status = status.as_str(), "Ticket status updated");

    Ok(Json(TicketMessageResponse {
        message: "Ticket updated".to_string(),
        ticket: TicketResponse::from(ticket),
    }))
}
