//! # ActorEntity Trait
//!
//! The `ActorEntity` trait is the contract every kitchen resource (capacity slot, stock
//! line, order record, item status, station board) implements to be owned by a
//! [`ResourceActor`](crate::ResourceActor).
//!
//! Unlike a classic CRUD store, the actor never invents identifiers. Every entity is
//! stored under a key derived from its creation payload ([`ActorEntity::key`]), which
//! makes "create if missing" idempotent and lets a sharded client route a payload to
//! the shard that owns its key before the entity exists.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`] defaults to `Ok(())`.
//!
//! Everything else is required.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by a `ResourceActor`.
///
/// # Async & Context
/// Hooks are `async` so an entity can call other actors while handling a message
/// (an item status updates the station board when it moves). The `Context` type is
/// injected at `run()` time, which keeps actor construction free of dependencies.
///
/// # Atomicity
/// The owning actor handles one message at a time. Whatever a hook does to `self`
/// between its first and last line is therefore atomic with respect to every other
/// request for the same key.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique key of this entity. Also used to pick a shard.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance. Use `()` when the entity is
    /// only ever changed through actions.
    type Update: Send + Sync + Debug;

    /// Enum of resource-specific operations (e.g. `Reserve`, `Claim`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Must be `Clone` when the entity is served by more than one shard.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One enum per actor rather than one per message: callers match a single type, at
    /// the price of an action's signature allowing errors only another action produces.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Key under which an entity built from `params` will be stored.
    fn key(params: &Self::Create) -> Self::Id;

    /// Construct the full entity from its key and payload.
    /// Called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called after the entity is constructed and before it is stored.
    /// Returning an error aborts the creation; nothing is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
