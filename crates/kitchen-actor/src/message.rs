//! # Generic Messages
//!
//! Message types exchanged between a `ResourceClient` and the `ResourceActor` shard
//! that owns the addressed key.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Outcome of an `Ensure` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ensured<Id> {
    pub id: Id,
    /// `false` when the key was already present and nothing was changed.
    pub created: bool,
}

/// Internal message type sent to the actor to request operations.
///
/// The set is deliberately small:
///
/// - **Create**: insert a new entity; fails with `AlreadyExists` if the key is taken.
/// - **Ensure**: get-or-create. Replaying the same payload is a no-op.
/// - **EnsureAction**: get-or-create, then run an action, as one message. This is the
///   primitive behind lazily created, atomically reserved capacity slots.
/// - **Get** / **List**: reads.
/// - **Update**: state mutation through [`ActorEntity::Update`].
/// - **Action**: custom [`ActorEntity::Action`] on an existing entity.
///
/// There is no delete: retention belongs to the persistence layer, not to kitchen logic.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Ensure {
        params: T::Create,
        respond_to: Response<Ensured<T::Id>>,
    },
    EnsureAction {
        params: T::Create,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}
