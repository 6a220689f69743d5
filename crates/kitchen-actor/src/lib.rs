//! # Kitchen Actor
//!
//! The keyed actor runtime underneath the kitchen flow. It implements a
//! **Resource-Oriented Architecture** on top of the **Actor Model**: every kind of
//! kitchen state (capacity slots, stock lines, orders, item statuses, the station
//! board) is a resource owned by an actor, and all changes to it travel as messages.
//!
//! ## Why actors here?
//!
//! The kitchen's hard guarantees are all *per key*:
//!
//! - a capacity slot never admits more than its limits, however many requests race;
//! - an item never skips or repeats a station;
//! - the station board and item statuses agree.
//!
//! An actor processes one message at a time, so a check-then-mutate inside a single
//! message is atomic for that key, with no locks. Sharding the key space across
//! several actors ([`ResourceActor::sharded`]) keeps unrelated keys in parallel.
//!
//! **Further Reading**:
//! - [Actors with Tokio](https://ryhl.io/blog/actors-with-tokio/)
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]): state and business rules of one resource.
//! 2. **Runtime Layer** ([`ResourceActor`]): message loop, store, sharding.
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]): typed requests.
//!
//! ## Keys, not counters
//!
//! Entities are stored under [`ActorEntity::key`], computed from the creation payload.
//! That is what makes the two composite requests possible:
//!
//! - [`ResourceClient::ensure`]: create if missing, otherwise leave untouched.
//! - [`ResourceClient::ensure_action`]: create if missing, then run an action, as one
//!   message. A slot that does not exist yet and a slot with spare capacity look the
//!   same to the caller.
//!
//! ```rust
//! use kitchen_actor::{ActorEntity, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Pass { window: String, plates: u32, limit: u32 }
//!
//! #[derive(Debug)] struct PassCreate { window: String, limit: u32 }
//! #[derive(Debug)] enum PassAction { Plate }
//! #[derive(Debug, thiserror::Error)] #[error("pass is full")] struct PassFull;
//!
//! #[async_trait]
//! impl ActorEntity for Pass {
//!     type Id = String; type Create = PassCreate; type Update = ();
//!     type Action = PassAction; type ActionResult = u32;
//!     type Context = (); type Error = PassFull;
//!
//!     fn key(params: &PassCreate) -> String { params.window.clone() }
//!     fn from_create_params(window: String, p: PassCreate) -> Result<Self, PassFull> {
//!         Ok(Self { window, plates: 0, limit: p.limit })
//!     }
//!     async fn on_update(&mut self, _: (), _: &()) -> Result<(), PassFull> { Ok(()) }
//!     async fn handle_action(&mut self, _: PassAction, _: &()) -> Result<u32, PassFull> {
//!         if self.plates == self.limit { return Err(PassFull); }
//!         self.plates += 1;
//!         Ok(self.plates)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Pass>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let create = || PassCreate { window: "12:00".into(), limit: 1 };
//!     assert_eq!(client.ensure_action(create(), PassAction::Plate).await.unwrap(), 1);
//!
//!     let err = client.ensure_action(create(), PassAction::Plate).await.unwrap_err();
//!     assert!(err.entity_error::<PassFull>().is_some());
//! }
//! ```
//!
//! ## Context Injection Pattern
//!
//! Dependencies are injected at **runtime** via `run(context)`, not at construction.
//! Item-status actors, for instance, receive the station-board client so a move can
//! update the board in the same message that changes the item.
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers a real `ResourceClient` from scripted expectations, so
//! code that calls an actor can be tested without one. See the [`mock`] module.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod telemetry;

// Re-export core types for convenience
pub use actor::{spawn_sharded, ResourceActor};
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Ensured, ResourceRequest, Response};
