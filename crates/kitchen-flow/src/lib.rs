//! # Kitchen Flow
//!
//! Order admission, capacity slot scheduling and station routing for a production
//! kitchen, built on the [`kitchen_actor`] runtime.
//!
//! ## Core Components
//!
//! - **[intake]**: validates, prices and admits orders, then fans them out.
//! - **[scheduler]**: first-fit capacity slots and the `visible_at` instant.
//! - **[routing]**: per-item station progress and the station board.
//! - **[publish]**: framed order log, audit log and live event feed.
//! - **[lifecycle]**: wires every actor and task together and shuts them down.
//! - **[http]**: the axum JSON surface.
//!
//! Each actor module (`slot_actor`, `order_actor`, ...) holds one [`ActorEntity`]
//! implementation; [`clients`] wraps them in typed APIs.
//!
//! [`ActorEntity`]: kitchen_actor::ActorEntity
//!
//! ## Testing
//!
//! [`clock::FixedClock`] makes time deterministic; [`publish::MemoryEventLog`] stands in
//! for the file log. See [`kitchen_actor::mock`] for testing clients without actors.

pub mod clients;
pub mod clock;
pub mod config;
pub mod http;
pub mod intake;
pub mod inventory_actor;
pub mod item_actor;
pub mod lifecycle;
pub mod menu;
pub mod model;
pub mod order_actor;
pub mod publish;
pub mod routing;
pub mod scheduler;
pub mod slot_actor;
pub mod station_actor;
