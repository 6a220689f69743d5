//! # Inventory Client
//!
//! Provides a high‑level API for interacting with the inventory actor.
use crate::inventory_actor::{InventoryAction, InventoryActionResult, InventoryError};
use crate::model::{BranchStock, StockCreate, StockUpdate};
use async_trait::async_trait;
use kitchen_actor::{ActorClient, FrameworkError, ResourceClient};
use std::collections::HashMap;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct InventoryClient {
    inner: ResourceClient<BranchStock>,
}

impl InventoryClient {
    pub fn new(inner: ResourceClient<BranchStock>) -> Self {
        Self { inner }
    }

    /// Check that `branch` holds at least `required` grams of every ingredient.
    #[instrument(skip(self, required))]
    pub async fn check(
        &self,
        branch: &str,
        required: HashMap<String, u64>,
    ) -> Result<(), InventoryError> {
        debug!(ingredients = required.len(), "Checking stock");
        match self
            .inner
            .perform_action(branch.to_string(), InventoryAction::Check { required })
            .await
        {
            Ok(InventoryActionResult::Available) => Ok(()),
            Err(FrameworkError::NotFound(_)) => Err(InventoryError::UnknownBranch(branch.into())),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// Set absolute stock levels for a branch, creating its record if needed.
    #[instrument(skip(self, grams))]
    pub async fn restock(
        &self,
        branch: &str,
        grams: HashMap<String, u64>,
    ) -> Result<(), InventoryError> {
        let ensured = self
            .inner
            .ensure(StockCreate {
                branch: branch.to_string(),
                grams: grams.clone(),
            })
            .await
            .map_err(Self::map_error)?;
        if !ensured.created {
            self.inner
                .update(branch.to_string(), StockUpdate { grams })
                .await
                .map_err(Self::map_error)?;
        }
        Ok(())
    }
}

#[async_trait]
impl ActorClient<BranchStock> for InventoryClient {
    type Error = InventoryError;

    fn inner(&self) -> &ResourceClient<BranchStock> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into_entity_error::<InventoryError>().unwrap_or_else(|e| match e {
            FrameworkError::NotFound(branch) => InventoryError::UnknownBranch(branch),
            other => InventoryError::ActorCommunicationError(other.to_string()),
        })
    }
}
