//! Error types for the station board actor.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StationError {
    #[error("No board for branch: {0}")]
    NotFound(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
