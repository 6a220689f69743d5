//! [`ActorEntity`] implementation for [`Order`].
//!
//! The create payload is the complete order; the intake pipeline has already
//! validated, priced and scheduled it.

use super::actions::OrderAction;
use super::error::OrderError;
use crate::model::{Order, OrderId, OrderStatus};
use async_trait::async_trait;
use kitchen_actor::ActorEntity;

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = Order;
    type Update = ();
    type Action = OrderAction;
    /// `true` when the action changed the order.
    type ActionResult = bool;
    type Context = ();
    type Error = OrderError;

    fn key(params: &Order) -> OrderId {
        params.id
    }

    fn from_create_params(_id: OrderId, order: Order) -> Result<Self, OrderError> {
        if order.items.is_empty() {
            return Err(OrderError::InvalidRecord(format!("{} has no items", order.id)));
        }
        if order.visible_at > order.slot_start {
            return Err(OrderError::InvalidRecord(format!(
                "{} becomes visible after its slot starts",
                order.id
            )));
        }
        Ok(order)
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), OrderError> {
        Ok(())
    }

    async fn handle_action(&mut self, action: OrderAction, _ctx: &()) -> Result<bool, OrderError> {
        match action {
            OrderAction::Activate => {
                if self.status != OrderStatus::Accepted {
                    return Ok(false);
                }
                self.status = OrderStatus::Active;
                Ok(true)
            }
            OrderAction::MarkRouted { at, unroutable } => {
                if self.routed_at.is_some() {
                    return Ok(false);
                }
                self.routed_at = Some(at);
                self.unroutable_items = unroutable;
                Ok(true)
            }
            OrderAction::Complete => {
                if self.status == OrderStatus::Completed {
                    return Ok(false);
                }
                self.status = OrderStatus::Completed;
                Ok(true)
            }
        }
    }
}
