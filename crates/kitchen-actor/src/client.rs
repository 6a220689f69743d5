//! # Generic Client
//!
//! The cloneable handle used to talk to one or more `ResourceActor` shards.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{Ensured, ResourceRequest};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for interacting with `ResourceActor` shards.
///
/// Holds one sender per shard; every request addressed to a key goes to the shard
/// selected by hashing that key, so all operations on one key are serialized by one
/// actor. Cloning is cheap.
#[derive(Clone)]
pub struct ResourceClient<T: ActorEntity> {
    senders: Arc<[mpsc::Sender<ResourceRequest<T>>]>,
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self::from_shards(vec![sender])
    }

    pub fn from_shards(senders: Vec<mpsc::Sender<ResourceRequest<T>>>) -> Self {
        Self {
            senders: senders.into(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.senders.len()
    }

    /// Index of the shard that owns `id`.
    pub fn shard_of(&self, id: &T::Id) -> usize {
        if self.senders.len() <= 1 {
            return 0;
        }
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        (hasher.finish() % self.senders.len() as u64) as usize
    }

    async fn request<R>(
        &self,
        shard: usize,
        build: impl FnOnce(oneshot::Sender<Result<R, FrameworkError>>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.senders[shard]
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Inserts a new entity. Fails with `AlreadyExists` if its key is taken.
    pub async fn create(&self, params: T::Create) -> Result<T::Id, FrameworkError> {
        let shard = self.shard_of(&T::key(&params));
        self.request(shard, |respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    /// Get-or-create; idempotent for a given payload key.
    pub async fn ensure(&self, params: T::Create) -> Result<Ensured<T::Id>, FrameworkError> {
        let shard = self.shard_of(&T::key(&params));
        self.request(shard, |respond_to| ResourceRequest::Ensure { params, respond_to })
            .await
    }

    /// Get-or-create, then run `action`, in a single message to the owning shard.
    pub async fn ensure_action(
        &self,
        params: T::Create,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        let shard = self.shard_of(&T::key(&params));
        self.request(shard, |respond_to| ResourceRequest::EnsureAction {
            params,
            action,
            respond_to,
        })
        .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let shard = self.shard_of(&id);
        self.request(shard, |respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    /// Snapshot of every entity across all shards. Shards are read one after another,
    /// so the result is not a single point-in-time view.
    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        let mut all = Vec::new();
        for shard in 0..self.senders.len() {
            let mut part = self
                .request(shard, |respond_to| ResourceRequest::List { respond_to })
                .await?;
            all.append(&mut part);
        }
        Ok(all)
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError> {
        let shard = self.shard_of(&id);
        self.request(shard, |respond_to| ResourceRequest::Update {
            id,
            update,
            respond_to,
        })
        .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        let shard = self.shard_of(&id);
        self.request(shard, |respond_to| ResourceRequest::Action {
            id,
            action,
            respond_to,
        })
        .await
    }
}
