//! Error types for the item status actor.

use crate::model::ItemStage;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ItemError {
    #[error("Item not found: {0}")]
    NotFound(String),

    /// The item is not at the station the operator acted from.
    #[error("Item {key} is at {current:?}, not at {requested}")]
    WrongStation {
        key: String,
        current: Option<String>,
        requested: String,
    },

    #[error("Item {key} is {stage:?}, expected pending")]
    NotPending { key: String, stage: ItemStage },

    #[error("Item {0} is already completed")]
    AlreadyCompleted(String),

    /// Items without station data are handled manually.
    #[error("Item {0} has no station sequence")]
    Unroutable(String),

    /// Only items without station data are resolved by hand.
    #[error("Item {0} has a station sequence; mark it ready at its station")]
    HasStations(String),

    /// The station board rejected or lost the update.
    #[error("Station board error: {0}")]
    Board(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
