//! [`ActorEntity`] implementation for [`CapacitySlot`].
//!
//! Slots are keyed by their start instant and created on first reservation through
//! `ensure_action`, so "slot does not exist yet" and "slot has room" are handled by
//! the same message.

use super::actions::{SlotAction, SlotActionResult, SlotUsage};
use super::error::SlotError;
use crate::model::{CapacitySlot, SlotCreate, SlotId};
use async_trait::async_trait;
use kitchen_actor::ActorEntity;

#[async_trait]
impl ActorEntity for CapacitySlot {
    type Id = SlotId;
    type Create = SlotCreate;
    type Update = ();
    type Action = SlotAction;
    type ActionResult = SlotActionResult;
    type Context = ();
    type Error = SlotError;

    fn key(params: &SlotCreate) -> SlotId {
        SlotId(params.start)
    }

    fn from_create_params(id: SlotId, params: SlotCreate) -> Result<Self, SlotError> {
        if params.end <= params.start {
            return Err(SlotError::InvalidWindow(id.to_string()));
        }
        Ok(Self {
            id,
            start: params.start,
            end: params.end,
            reserved_orders: 0,
            reserved_items: 0,
            max_orders: params.max_orders,
            max_items: params.max_items,
        })
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), SlotError> {
        Ok(())
    }

    /// # Actions
    /// - `Reserve`: increments both counters iff both stay within their limits
    /// - `Release`: decrements both counters iff a reservation of that size exists
    async fn handle_action(
        &mut self,
        action: SlotAction,
        _ctx: &(),
    ) -> Result<SlotActionResult, SlotError> {
        match action {
            SlotAction::Reserve { items } => {
                if self.is_zero_capacity() {
                    return Err(SlotError::ZeroCapacity(self.id.to_string()));
                }
                if !self.fits(items) {
                    return Err(SlotError::Full {
                        slot: self.id.to_string(),
                        orders: self.reserved_orders,
                        items: self.reserved_items,
                    });
                }
                self.reserved_orders += 1;
                self.reserved_items += items;
                Ok(SlotActionResult::Reserved(self.usage()))
            }
            SlotAction::Release { items } => {
                if self.reserved_orders == 0 || self.reserved_items < items {
                    return Err(SlotError::NothingToRelease(self.id.to_string()));
                }
                self.reserved_orders -= 1;
                self.reserved_items -= items;
                Ok(SlotActionResult::Released(self.usage()))
            }
        }
    }
}

impl CapacitySlot {
    fn usage(&self) -> SlotUsage {
        SlotUsage {
            reserved_orders: self.reserved_orders,
            reserved_items: self.reserved_items,
        }
    }
}
