//! # Order Store Actor
//!
//! Holds admitted orders keyed by [`OrderId`](crate::model::OrderId). Orders are
//! created once by the intake pipeline (or re-ensured by a log replay) and afterwards
//! only change through [`OrderAction`]s.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Order;
use kitchen_actor::{ResourceActor, ResourceClient};

/// Creates the order store shards and their client.
pub fn new(shards: usize, buffer: usize) -> (Vec<ResourceActor<Order>>, ResourceClient<Order>) {
    ResourceActor::sharded(shards, buffer)
}
