//! # Capacity Slot Actor
//!
//! Owns every [`CapacitySlot`]. Slots are sharded by start instant; one slot always
//! lives on one shard, so reservations against it are linearizable while different
//! slots are served in parallel.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](kitchen_actor::ActorEntity) implementation for [`CapacitySlot`]
//! - [`error`] - [`SlotError`]
//! - [`actions`] - [`SlotAction`] (`Reserve`, `Release`) and [`SlotActionResult`]
//! - [`new()`] - creates the shards and their routing client

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::CapacitySlot;
use kitchen_actor::{ResourceActor, ResourceClient};

/// Creates the slot actor shards and their client.
pub fn new(
    shards: usize,
    buffer: usize,
) -> (Vec<ResourceActor<CapacitySlot>>, ResourceClient<CapacitySlot>) {
    ResourceActor::sharded(shards, buffer)
}
