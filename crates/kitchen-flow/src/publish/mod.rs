//! # Publication
//!
//! Everything an admitted order is announced through after it is acknowledged:
//!
//! - [`log`] - durable, append-only binary logs ([`FileEventLog`], [`MemoryEventLog`])
//! - [`record`] - the `bincode` records written to them ([`OrderRecord`], [`AuditEntry`])
//! - [`live`] - the broadcast feed behind `/api/live` ([`LiveFeed`], [`KitchenEvent`])
//! - [`retry`] - bounded exponential backoff used by the fan-out

pub mod live;
pub mod log;
pub mod record;
pub mod retry;

pub use live::*;
pub use log::*;
pub use record::*;
pub use retry::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Event log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot encode record: {0}")]
    Encode(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Publication target unavailable: {0}")]
    Unavailable(String),
}
