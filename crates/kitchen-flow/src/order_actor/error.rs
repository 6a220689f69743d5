//! Error types for the order store.

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// An order with this id is already stored.
    #[error("Order already exists: {0}")]
    AlreadyExists(String),

    /// The record handed to the store is not a valid order.
    #[error("Invalid order record: {0}")]
    InvalidRecord(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
