//! # Item Status Actor
//!
//! The authoritative routing record of every order item, sharded by
//! `(order id, item index)`. Different items move in parallel on different shards;
//! moves of one item are serialized by its shard.
//!
//! ## Context
//!
//! Each shard runs with a [`StationBoardClient`](crate::clients::StationBoardClient):
//!
//! ```rust,ignore
//! let (item_actors, item_client) = item_actor::new(shards, buffer);
//! for actor in item_actors {
//!     tokio::spawn(actor.run(board_client.clone()));
//! }
//! ```
//!
//! Item statuses call the board; the board never calls back, so the dependency
//! graph stays acyclic and shutdown by dropping clients works.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::ItemStatus;
use kitchen_actor::{ResourceActor, ResourceClient};

/// Creates the item status shards and their client.
pub fn new(
    shards: usize,
    buffer: usize,
) -> (Vec<ResourceActor<ItemStatus>>, ResourceClient<ItemStatus>) {
    ResourceActor::sharded(shards, buffer)
}
