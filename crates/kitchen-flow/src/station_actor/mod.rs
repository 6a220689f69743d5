//! # Station Board Actor
//!
//! One [`StationBoard`] per branch, created on first use. Item-status actors are its
//! only writers during normal operation; the station router reconciles a board with
//! the item statuses when rebuilding it. Both go through the same per-item step
//! check, so the two never overwrite each other's newer writes.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::StationBoard;
use kitchen_actor::{ResourceActor, ResourceClient};

/// Creates the board shards (split by branch) and their client.
pub fn new(
    shards: usize,
    buffer: usize,
) -> (Vec<ResourceActor<StationBoard>>, ResourceClient<StationBoard>) {
    ResourceActor::sharded(shards, buffer)
}
