use thiserror::Error;

/// Why an order was not admitted. Each variant maps to one stable reason code.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IntakeError {
    /// A product, bundle, extra or excluded ingredient the menu does not know.
    #[error("{0}")]
    InvalidItem(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("No capacity left to finish the order today")]
    CapacityExhausted,

    #[error("{0}")]
    InsufficientInventory(String),

    /// Infrastructure failure before the order was persisted. The detail is logged,
    /// never returned to the caller.
    #[error("Internal error")]
    Internal(String),
}

impl IntakeError {
    pub fn code(&self) -> &'static str {
        match self {
            IntakeError::InvalidItem(_) => "invalid_item",
            IntakeError::InvalidRequest(_) => "invalid_request",
            IntakeError::CapacityExhausted => "capacity_exhausted",
            IntakeError::InsufficientInventory(_) => "insufficient_inventory",
            IntakeError::Internal(_) => "internal",
        }
    }
}
