use crate::item_actor::ItemError;
use crate::order_actor::OrderError;
use crate::station_actor::StationError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RoutingError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The order is accepted but its `visible_at` has not come yet.
    #[error("Order {0} is not visible to the kitchen yet")]
    NotVisible(String),

    #[error(transparent)]
    Item(#[from] ItemError),

    #[error(transparent)]
    Board(#[from] StationError),

    #[error(transparent)]
    Order(#[from] OrderError),
}
