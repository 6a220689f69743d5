//! Error types for the capacity slot actor.

use thiserror::Error;

/// Errors that can occur during slot operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SlotError {
    /// Reserving would exceed the order or item limit.
    #[error("Slot {slot} is full: {orders} orders / {items} items reserved")]
    Full {
        slot: String,
        orders: u32,
        items: u32,
    },

    /// The slot admits nothing.
    #[error("Slot {0} has zero capacity")]
    ZeroCapacity(String),

    #[error("Slot window is empty: {0}")]
    InvalidWindow(String),

    /// Release without a matching reservation.
    #[error("Nothing to release in slot {0}")]
    NothingToRelease(String),

    #[error("Slot not found: {0}")]
    NotFound(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
