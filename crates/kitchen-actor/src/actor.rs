//! # Generic Actor Server
//!
//! This module defines the `ResourceActor`, the server half of the actor model. One
//! actor owns one shard of the key space; it processes messages for that shard
//! sequentially and is the only code that ever touches the entities it stores.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{Ensured, ResourceRequest};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// **Concurrency model**: each actor processes its own messages one at a time, so no
/// `Mutex` guards the `store`. Every request for a given key is handled by the same
/// shard, which makes a test-and-increment inside [`ActorEntity::handle_action`] a
/// single linearizable step no matter how many clients race on that key. Keys that
/// hash to different shards are served fully in parallel.
///
/// # Usage Pattern
///
/// 1. **Create**: `ResourceActor::new()` (one shard) or `ResourceActor::sharded()`.
/// 2. **Wire**: pass dependencies into `actor.run(context)`.
/// 3. **Run**: spawn each actor's loop in its own task, or let [`spawn_sharded`] do it.
///
/// ```rust
/// use kitchen_actor::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Shelf { name: String, used: u32 }
/// #[derive(Debug)] struct ShelfCreate { name: String }
/// #[derive(Debug, thiserror::Error)] #[error("shelf error")] struct ShelfError;
///
/// #[async_trait]
/// impl ActorEntity for Shelf {
///     type Id = String;
///     type Create = ShelfCreate;
///     type Update = ();
///     type Action = ();
///     type ActionResult = u32;
///     type Context = ();
///     type Error = ShelfError;
///
///     fn key(params: &ShelfCreate) -> String { params.name.clone() }
///     fn from_create_params(id: String, _: ShelfCreate) -> Result<Self, ShelfError> {
///         Ok(Self { name: id, used: 0 })
///     }
///     async fn on_update(&mut self, _: (), _: &()) -> Result<(), ShelfError> { Ok(()) }
///     async fn handle_action(&mut self, _: (), _: &()) -> Result<u32, ShelfError> {
///         self.used += 1;
///         Ok(self.used)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Shelf>::new(10);
///     tokio::spawn(actor.run(()));
///
///     let used = client
///         .ensure_action(ShelfCreate { name: "pass".into() }, ())
///         .await
///         .unwrap();
///     assert_eq!(used, 1);
/// }
/// ```
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    shard: usize,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a single-shard actor and its client.
    ///
    /// `buffer_size` is the capacity of the mpsc channel; when it is full, client calls
    /// wait for space.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (Self::with_receiver(receiver, 0), ResourceClient::new(sender))
    }

    /// Creates `shards` actors and one client that routes each key to its owner.
    ///
    /// A shard count of zero is treated as one.
    pub fn sharded(shards: usize, buffer_size: usize) -> (Vec<Self>, ResourceClient<T>) {
        let shards = shards.max(1);
        let mut actors = Vec::with_capacity(shards);
        let mut senders = Vec::with_capacity(shards);
        for shard in 0..shards {
            let (sender, receiver) = mpsc::channel(buffer_size);
            actors.push(Self::with_receiver(receiver, shard));
            senders.push(sender);
        }
        (actors, ResourceClient::from_shards(senders))
    }

    fn with_receiver(receiver: mpsc::Receiver<ResourceRequest<T>>, shard: usize) -> Self {
        Self {
            receiver,
            store: HashMap::new(),
            shard,
        }
    }

    /// Runs the actor's event loop until every client is dropped.
    ///
    /// The `context` is handed to every entity hook, so dependencies created after the
    /// actor (other actors' clients) can still be injected before the loop starts.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = entity_type::<T>();
        let shard = self.shard;
        info!(entity_type, shard, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::key(&params);
                    let result = if self.store.contains_key(&id) {
                        warn!(entity_type, %id, "Already exists");
                        Err(FrameworkError::AlreadyExists(id.to_string()))
                    } else {
                        self.insert(id.clone(), params, &context).await.map(|()| id)
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Ensure { params, respond_to } => {
                    let id = T::key(&params);
                    let result = if self.store.contains_key(&id) {
                        debug!(entity_type, %id, "Ensure: present");
                        Ok(Ensured { id, created: false })
                    } else {
                        self.insert(id.clone(), params, &context)
                            .await
                            .map(|()| Ensured { id, created: true })
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::EnsureAction {
                    params,
                    action,
                    respond_to,
                } => {
                    let id = T::key(&params);
                    debug!(entity_type, %id, ?action, "EnsureAction");
                    let created = if self.store.contains_key(&id) {
                        Ok(())
                    } else {
                        self.insert(id.clone(), params, &context).await
                    };
                    let result = match created {
                        Ok(()) => self.act(&id, action, &context).await,
                        Err(e) => Err(e),
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, shard, size = self.store.len(), "List");
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let result = match self.store.get_mut(&id) {
                        Some(item) => match item.on_update(update, &context).await {
                            Ok(()) => {
                                info!(entity_type, %id, "Updated");
                                Ok(item.clone())
                            }
                            Err(e) => {
                                warn!(entity_type, %id, error = %e, "Update failed");
                                Err(FrameworkError::EntityError(Box::new(e)))
                            }
                        },
                        None => {
                            warn!(entity_type, %id, "Not found");
                            Err(FrameworkError::NotFound(id.to_string()))
                        }
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let result = self.act(&id, action, &context).await;
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, shard, size = self.store.len(), "Shutdown");
    }

    async fn insert(
        &mut self,
        id: T::Id,
        params: T::Create,
        context: &T::Context,
    ) -> Result<(), FrameworkError> {
        let entity_type = entity_type::<T>();
        let mut item = T::from_create_params(id.clone(), params).map_err(|e| {
            warn!(entity_type, %id, error = %e, "Create failed");
            FrameworkError::EntityError(Box::new(e))
        })?;
        if let Err(e) = item.on_create(context).await {
            warn!(entity_type, %id, error = %e, "on_create failed");
            return Err(FrameworkError::EntityError(Box::new(e)));
        }
        self.store.insert(id.clone(), item);
        info!(entity_type, %id, size = self.store.len(), "Created");
        Ok(())
    }

    /// Entities must leave `self` untouched when `handle_action` returns an error.
    async fn act(
        &mut self,
        id: &T::Id,
        action: T::Action,
        context: &T::Context,
    ) -> Result<T::ActionResult, FrameworkError> {
        let entity_type = entity_type::<T>();
        let Some(item) = self.store.get_mut(id) else {
            warn!(entity_type, %id, "Not found");
            return Err(FrameworkError::NotFound(id.to_string()));
        };
        let result = item
            .handle_action(action, context)
            .await
            .map_err(|e| FrameworkError::EntityError(Box::new(e)));
        match &result {
            Ok(_) => debug!(entity_type, %id, "Action ok"),
            Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
        }
        result
    }
}

/// Creates `shards` actors, spawns each on its own task with a clone of `context`, and
/// returns the routing client together with the task handles.
pub fn spawn_sharded<T>(
    shards: usize,
    buffer_size: usize,
    context: T::Context,
) -> (ResourceClient<T>, Vec<JoinHandle<()>>)
where
    T: ActorEntity,
    T::Context: Clone,
{
    let (actors, client) = ResourceActor::<T>::sharded(shards, buffer_size);
    let handles = actors
        .into_iter()
        .map(|actor| tokio::spawn(actor.run(context.clone())))
        .collect();
    (client, handles)
}

// Short type name ("CapacitySlot" rather than "kitchen_flow::model::capacity::CapacitySlot").
fn entity_type<T>() -> &'static str {
    std::any::type_name::<T>()
        .rsplit("::")
        .next()
        .unwrap_or("Unknown")
}
