use crate::slot_actor::SlotError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScheduleError {
    /// Every slot up to closing is full or cannot finish the order in time.
    #[error("No capacity left before closing")]
    CapacityExhausted,

    #[error(transparent)]
    Slot(#[from] SlotError),
}
