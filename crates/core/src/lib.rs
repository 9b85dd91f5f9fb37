pub mod config;
pub mod ticket;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use ticket::{
    sla_duration, NewTicket, Priority, SlaSnapshot, SqliteTicketStore, Ticket, TicketError,
    TicketId, TicketStatus, TicketStore,
};
