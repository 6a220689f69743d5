//! # Inventory Actor
//!
//! Per-branch ingredient stock answering the availability check the intake pipeline
//! runs before admitting an order.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](kitchen_actor::ActorEntity) implementation for [`BranchStock`]
//! - [`error`] - [`InventoryError`]
//! - [`actions`] - [`InventoryAction::Check`]
//! - [`new()`] - factory for the actor and its client
//!
//! ## Usage
//!
//! ```rust
//! use kitchen_flow::clients::InventoryClient;
//! use kitchen_flow::inventory_actor;
//! use std::collections::HashMap;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, generic_client) = inventory_actor::new(16);
//!     let client = InventoryClient::new(generic_client);
//!     tokio::spawn(actor.run(()));
//!
//!     client.restock("main", HashMap::from([("flour".to_string(), 2_000)])).await?;
//!     client.check("main", HashMap::from([("flour".to_string(), 250)])).await?;
//!     Ok(())
//! }
//! ```
//!
//! The check never reserves: stock is consumed by the kitchen, outside this system.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::BranchStock;
use kitchen_actor::{ResourceActor, ResourceClient};

/// Creates a new inventory actor and its client.
pub fn new(buffer: usize) -> (ResourceActor<BranchStock>, ResourceClient<BranchStock>) {
    ResourceActor::new(buffer)
}
