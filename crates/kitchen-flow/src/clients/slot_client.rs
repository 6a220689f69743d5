//! # Slot Client
//!
//! Typed access to the capacity slot shards.
use crate::model::{CapacitySlot, SlotCreate, SlotId};
use crate::slot_actor::{SlotAction, SlotActionResult, SlotError, SlotUsage};
use async_trait::async_trait;
use kitchen_actor::{ActorClient, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct SlotClient {
    inner: ResourceClient<CapacitySlot>,
}

impl SlotClient {
    pub fn new(inner: ResourceClient<CapacitySlot>) -> Self {
        Self { inner }
    }

    /// Creates the slot if needed and reserves one order plus `items` units in the
    /// same message.
    #[instrument(skip(self, params), fields(slot = %SlotId(params.start)))]
    pub async fn reserve(&self, params: SlotCreate, items: u32) -> Result<SlotUsage, SlotError> {
        debug!(items, "Reserving");
        match self
            .inner
            .ensure_action(params, SlotAction::Reserve { items })
            .await
            .map_err(Self::map_error)?
        {
            SlotActionResult::Reserved(usage) => Ok(usage),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn release(&self, id: SlotId, items: u32) -> Result<SlotUsage, SlotError> {
        debug!("Releasing");
        match self
            .inner
            .perform_action(id, SlotAction::Release { items })
            .await
            .map_err(Self::map_error)?
        {
            SlotActionResult::Released(usage) => Ok(usage),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(result: SlotActionResult) -> SlotError {
    SlotError::ActorCommunicationError(format!("unexpected action result {result:?}"))
}

#[async_trait]
impl ActorClient<CapacitySlot> for SlotClient {
    type Error = SlotError;

    fn inner(&self) -> &ResourceClient<CapacitySlot> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into_entity_error::<SlotError>().unwrap_or_else(|e| match e {
            FrameworkError::NotFound(id) => SlotError::NotFound(id),
            other => SlotError::ActorCommunicationError(other.to_string()),
        })
    }
}
