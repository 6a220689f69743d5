//! Error types for the inventory actor.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum InventoryError {
    #[error("Insufficient {ingredient} at {branch}: requested {requested}g, available {available}g")]
    Insufficient {
        branch: String,
        ingredient: String,
        requested: u64,
        available: u64,
    },

    /// No stock has ever been recorded for the branch.
    #[error("Unknown branch: {0}")]
    UnknownBranch(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
