//! Pure data structures shared by the actors, the pipeline and the transports.

pub mod capacity;
pub mod item_status;
pub mod menu;
pub mod order;
pub mod station_board;
pub mod stock;

pub use capacity::*;
pub use item_status::*;
pub use menu::*;
pub use order::*;
pub use station_board::*;
pub use stock::*;
