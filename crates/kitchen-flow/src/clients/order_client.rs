//! # Order Client
//!
//! Provides a high‑level API for interacting with the order store.
//! It wraps a `ResourceClient<Order>` and exposes the allowed mutations.
use crate::model::{Order, OrderId};
use crate::order_actor::{OrderAction, OrderError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kitchen_actor::{ActorClient, FrameworkError, ResourceClient};
use tracing::{debug, info, instrument};

/// Client for interacting with the order store.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Persist a newly admitted order. Fails if the id is already stored.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn create_order(&self, order: Order) -> Result<OrderId, OrderError> {
        debug!(?order, "create_order called");
        info!("Sending create_order to actor");
        self.inner.create(order).await.map_err(Self::map_error)
    }

    /// Store the order unless it already is. Returns whether it was inserted.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn ensure_order(&self, order: Order) -> Result<bool, OrderError> {
        let ensured = self.inner.ensure(order).await.map_err(Self::map_error)?;
        Ok(ensured.created)
    }

    #[instrument(skip(self))]
    pub async fn activate(&self, id: OrderId) -> Result<bool, OrderError> {
        self.act(id, OrderAction::Activate).await
    }

    #[instrument(skip(self))]
    pub async fn mark_routed(
        &self,
        id: OrderId,
        at: DateTime<Utc>,
        unroutable: Vec<u32>,
    ) -> Result<bool, OrderError> {
        self.act(id, OrderAction::MarkRouted { at, unroutable }).await
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, id: OrderId) -> Result<bool, OrderError> {
        self.act(id, OrderAction::Complete).await
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<bool, OrderError> {
        debug!(?action, "Sending request");
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into_entity_error::<OrderError>().unwrap_or_else(|e| match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::AlreadyExists(id) => OrderError::AlreadyExists(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        })
    }
}
