//! # Item Status Client
use crate::item_actor::{ItemAction, ItemError};
use crate::model::{ItemKey, ItemStatus, ItemStatusCreate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kitchen_actor::{ActorClient, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct ItemStatusClient {
    inner: ResourceClient<ItemStatus>,
}

impl ItemStatusClient {
    pub fn new(inner: ResourceClient<ItemStatus>) -> Self {
        Self { inner }
    }

    /// Create the item status unless it exists. Returns whether it was created.
    #[instrument(skip(self, params), fields(key = %params.key))]
    pub async fn ensure(&self, params: ItemStatusCreate) -> Result<bool, ItemError> {
        debug!("Sending request");
        let ensured = self.inner.ensure(params).await.map_err(Self::map_error)?;
        Ok(ensured.created)
    }

    #[instrument(skip(self))]
    pub async fn claim(
        &self,
        key: ItemKey,
        station: String,
        at: DateTime<Utc>,
    ) -> Result<ItemStatus, ItemError> {
        self.inner
            .perform_action(key, ItemAction::Claim { station, at })
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn mark_ready(
        &self,
        key: ItemKey,
        station: String,
        at: DateTime<Utc>,
    ) -> Result<ItemStatus, ItemError> {
        self.inner
            .perform_action(key, ItemAction::MarkReady { station, at })
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, key: ItemKey, at: DateTime<Utc>) -> Result<ItemStatus, ItemError> {
        self.inner
            .perform_action(key, ItemAction::Resolve { at })
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<ItemStatus> for ItemStatusClient {
    type Error = ItemError;

    fn inner(&self) -> &ResourceClient<ItemStatus> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into_entity_error::<ItemError>().unwrap_or_else(|e| match e {
            FrameworkError::NotFound(key) => ItemError::NotFound(key),
            other => ItemError::ActorCommunicationError(other.to_string()),
        })
    }
}
