//! # System Lifecycle & Orchestration
//!
//! Starts, wires and stops every actor and background task of the kitchen.
//!
//! ## Start-up order
//!
//! [`KitchenSystem::start`] creates actors without dependencies first, then the ones
//! that need a client in their context:
//!
//! ```rust,ignore
//! // No dependencies
//! let (slot_actors, slot_client) = slot_actor::new(shards, buffer);
//! let (board_actors, board_client) = station_actor::new(shards, buffer);
//!
//! // Item statuses move their key on the station board inside the same step
//! let boards = StationBoardClient::new(board_client);
//! let (item_actors, item_client) = item_actor::new(shards, buffer);
//! for actor in item_actors {
//!     tokio::spawn(actor.run(boards.clone()));
//! }
//! ```
//!
//! After the actors come the router worker (draining the kitchen queue the fan-out
//! feeds), the intake pipeline and the [`VisibilitySweep`].
//!
//! ## Replay
//!
//! [`KitchenSystem::replay`] reads the order log back and feeds each record through the
//! same idempotent paths live traffic uses, so replaying twice changes nothing.
//!
//! ## Graceful Shutdown
//!
//! 1. **Stop the sweep** through its watch channel
//! 2. **Drop the intake pipeline** so the kitchen queue closes and the router worker drains
//! 3. **Drop all clients** - each actor's `receiver.recv()` returns `None`
//! 4. **Await completion** of every task
//!
//! Item actors hold a board client, so the board shards stop after the item shards.
//! The dependency graph is acyclic, which is what makes channel closure sufficient.

mod kitchen_system;
mod sweep;

pub use kitchen_system::*;
pub use sweep::*;
