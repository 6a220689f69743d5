//! # Order Intake Pipeline
//!
//! `submit` admits an order or rejects it with a reason code:
//!
//! 1. resolve and validate every line against the current menu snapshot
//! 2. price it (`rust_decimal`, rounded to the cent)
//! 3. optionally check branch stock for the ingredients it consumes
//! 4. reserve a capacity slot
//! 5. persist it; a failed write gives the slot back
//! 6. acknowledge, then hand the order to the [`FanOut`] without waiting for it
//!
//! Nothing after step 5 can turn an accepted order into a rejection.

mod error;
mod fanout;
pub mod pricing;
mod request;

pub use error::*;
pub use fanout::*;
pub use request::*;

use crate::clients::{InventoryClient, OrderClient};
use crate::clock::Clock;
use crate::inventory_actor::InventoryError;
use crate::menu::MenuCatalog;
use crate::model::{DisplayId, Fulfilment, Order, OrderId, OrderItem, OrderStatus};
use crate::scheduler::{ScheduleError, SlotScheduler};
use pricing::{build_items, ingredient_totals, price};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

pub struct IntakePipeline {
    menu: Arc<MenuCatalog>,
    scheduler: SlotScheduler,
    orders: OrderClient,
    inventory: InventoryClient,
    fanout: FanOut,
    clock: Arc<dyn Clock>,
    inventory_check: bool,
    default_branch: String,
}

impl IntakePipeline {
    pub fn new(
        menu: Arc<MenuCatalog>,
        scheduler: SlotScheduler,
        orders: OrderClient,
        inventory: InventoryClient,
        fanout: FanOut,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            menu,
            scheduler,
            orders,
            inventory,
            fanout,
            clock,
            inventory_check: false,
            default_branch: "main".to_string(),
        }
    }

    pub fn with_inventory_check(mut self, enabled: bool) -> Self {
        self.inventory_check = enabled;
        self
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    #[instrument(skip_all, fields(branch = tracing::field::Empty))]
    pub async fn submit(&self, request: OrderRequest) -> Result<OrderAck, IntakeError> {
        let branch = request
            .branch
            .clone()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| self.default_branch.clone());
        tracing::Span::current().record("branch", branch.as_str());

        validate_contact(&request)?;
        let menu = self.menu.snapshot();
        let items = build_items(&request.items, &menu)?;
        let pricing = price(
            &items,
            &request.fulfilment,
            request.delivery_fee,
            request.discount,
            request.discount_percent,
        )?;

        if self.inventory_check {
            self.check_stock(&branch, &items).await?;
        }

        let id = OrderId::new();
        let display_id = DisplayId::from(&id);
        let unit_count: u32 = items.iter().map(|item| item.quantity).sum();

        let assignment = self
            .scheduler
            .assign_slot(id, pricing.items_subtotal, unit_count)
            .await
            .map_err(|e| match e {
                ScheduleError::CapacityExhausted => IntakeError::CapacityExhausted,
                ScheduleError::Slot(e) => {
                    error!(order_id = %id, error = %e, "Slot reservation failed");
                    IntakeError::Internal(e.to_string())
                }
            })?;

        let now = self.clock.now();
        let order = Order {
            id,
            display_id: display_id.clone(),
            branch,
            customer: request.customer,
            fulfilment: request.fulfilment,
            items,
            pricing,
            slot_id: assignment.slot_id,
            slot_start: assignment.slot_start,
            visible_at: assignment.visible_at,
            status: if assignment.visible_at <= now {
                OrderStatus::Active
            } else {
                OrderStatus::Accepted
            },
            created_at: now,
            routed_at: None,
            unroutable_items: Vec::new(),
        };

        if let Err(e) = self.orders.create_order(order.clone()).await {
            error!(order_id = %id, error = %e, "Persisting order failed, releasing slot");
            if let Err(release) = self.scheduler.release(assignment.slot_id, unit_count).await {
                error!(order_id = %id, slot_id = %assignment.slot_id, error = %release, "Slot release failed");
            }
            return Err(IntakeError::Internal(e.to_string()));
        }

        info!(
            order_id = %id,
            %display_id,
            slot_id = %assignment.slot_id,
            visible_at = %assignment.visible_at,
            total = %order.pricing.final_total,
            "Order accepted"
        );

        let ack = OrderAck {
            order_id: id,
            display_id,
            total_price: order.pricing.items_subtotal,
            final_price: order.pricing.final_total,
            status: "accepted",
            slot_start: order.slot_start,
            visible_at: order.visible_at,
        };
        self.fanout.dispatch(order);
        Ok(ack)
    }

    /// Runs [`submit`](Self::submit) on its own task. Dropping the returned handle (a
    /// client hanging up, say) leaves the reservation, the stored order and the fan-out
    /// to finish together.
    pub fn spawn_submit(
        self: &Arc<Self>,
        request: OrderRequest,
    ) -> JoinHandle<Result<OrderAck, IntakeError>> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.submit(request).await })
    }

    async fn check_stock(&self, branch: &str, items: &[OrderItem]) -> Result<(), IntakeError> {
        match self.inventory.check(branch, ingredient_totals(items)).await {
            Ok(()) => Ok(()),
            Err(InventoryError::Insufficient {
                ingredient,
                requested,
                available,
                ..
            }) => {
                warn!(%ingredient, requested, available, "Insufficient stock");
                Err(IntakeError::InsufficientInventory(format!(
                    "not enough {ingredient} in stock"
                )))
            }
            Err(InventoryError::UnknownBranch(_)) => {
                warn!("No stock recorded for branch");
                Err(IntakeError::InsufficientInventory(format!(
                    "no stock recorded for branch {branch}"
                )))
            }
            Err(e) => {
                error!(error = %e, "Inventory check failed");
                Err(IntakeError::Internal(e.to_string()))
            }
        }
    }
}

fn validate_contact(request: &OrderRequest) -> Result<(), IntakeError> {
    if request.customer.name.trim().is_empty() {
        return Err(IntakeError::InvalidRequest("customer name is required".into()));
    }
    if let Fulfilment::Delivery { address } = &request.fulfilment {
        if address.trim().is_empty() {
            return Err(IntakeError::InvalidRequest("delivery needs an address".into()));
        }
    }
    Ok(())
}
