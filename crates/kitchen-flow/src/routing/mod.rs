//! # Station Router
//!
//! Turns a recorded order into per-item routing state and moves items through their
//! stations.
//!
//! Item statuses are the source of truth. Each one keeps its branch's
//! [`StationBoard`] in step from inside its own actor (see
//! [`item_actor`](crate::item_actor)), so a claim or a ready signal is one message and
//! different items advance in parallel. The router adds the order-level view on top:
//! completion, progress, manual resolution, station queues, and reconciling a board
//! with the item statuses.

mod error;
mod worker;

pub use error::*;
pub use worker::*;

use crate::clients::{ItemStatusClient, OrderClient, StationBoardClient};
use crate::clock::Clock;
use crate::model::{
    BoardEntry, ItemKey, ItemStage, ItemStatus, ItemStatusCreate, Order, OrderId, OrderStatus,
    StationBoard,
};
use crate::publish::{KitchenEvent, LiveFeed};
use kitchen_actor::ActorClient;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Name used for the unassigned list in live events.
pub const UNASSIGNED: &str = "unassigned";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedItem {
    pub index: u32,
    pub product: String,
    pub bundle: Option<String>,
    pub stations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingPlan {
    pub order_id: OrderId,
    pub items: Vec<PlannedItem>,
    /// Indexes of items without station data.
    pub unroutable: Vec<u32>,
    /// Item statuses created by this call; zero on replay.
    pub created: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ProgressStage {
    /// Admitted but not routed yet.
    Queued,
    InProgress {
        current_stage: String,
        stations: Vec<String>,
    },
    /// An item without station data is still waiting for manual handling.
    NeedsAttention { unroutable: Vec<u32> },
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemProgress {
    pub index: u32,
    pub product: String,
    pub stage: ItemStage,
    pub station: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderProgress {
    pub order_id: OrderId,
    pub status: OrderStatus,
    #[serde(flatten)]
    pub stage: ProgressStage,
    pub items: Vec<ItemProgress>,
}

#[derive(Clone)]
pub struct StationRouter {
    items: ItemStatusClient,
    boards: StationBoardClient,
    orders: OrderClient,
    live: LiveFeed,
    clock: Arc<dyn Clock>,
}

impl StationRouter {
    pub fn new(
        items: ItemStatusClient,
        boards: StationBoardClient,
        orders: OrderClient,
        live: LiveFeed,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            items,
            boards,
            orders,
            live,
            clock,
        }
    }

    /// Creates an item status for every item of `order` and puts each on its first
    /// station. Safe to call again for the same order. Orders still waiting for their
    /// `visible_at` are refused, so nothing reaches a display early.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn assign_order_to_stations(&self, order: &Order) -> Result<RoutingPlan, RoutingError> {
        if order.status == OrderStatus::Accepted {
            return Err(RoutingError::NotVisible(order.id.to_string()));
        }
        let now = self.clock.now();
        let mut plan = RoutingPlan {
            order_id: order.id,
            items: Vec::with_capacity(order.items.len()),
            unroutable: Vec::new(),
            created: 0,
        };

        for (index, item) in (0u32..).zip(&order.items) {
            let key = ItemKey::new(order.id, index);
            let created = self
                .items
                .ensure(ItemStatusCreate {
                    key,
                    branch: order.branch.clone(),
                    product: item.product.clone(),
                    bundle: item.bundle.clone(),
                    stations: item.stations.clone(),
                    created_at: now,
                })
                .await?;
            if created {
                plan.created += 1;
            }
            if !item.is_routable() {
                warn!(%key, product = %item.product, "Unroutable item");
                plan.unroutable.push(index);
                if created {
                    self.live.publish(KitchenEvent::ItemUnroutable {
                        key,
                        branch: order.branch.clone(),
                        product: item.product.clone(),
                    });
                }
            }
            plan.items.push(PlannedItem {
                index,
                product: item.product.clone(),
                bundle: item.bundle.clone(),
                stations: item.stations.clone(),
            });
        }

        self.orders
            .mark_routed(order.id, now, plan.unroutable.clone())
            .await?;
        info!(
            items = plan.items.len(),
            created = plan.created,
            unroutable = plan.unroutable.len(),
            "Order routed"
        );
        Ok(plan)
    }

    /// An operator starts working on an item at `station`.
    #[instrument(skip(self))]
    pub async fn claim(&self, key: ItemKey, station: &str) -> Result<ItemStatus, RoutingError> {
        let status = self
            .items
            .claim(key, station.to_string(), self.clock.now())
            .await?;
        self.live.publish(KitchenEvent::ItemClaimed {
            key,
            branch: status.branch.clone(),
            station: station.to_string(),
        });
        Ok(status)
    }

    /// An operator signals the item is done at `station`: it moves on to its next
    /// station, or completes. Completing the last item completes the order.
    #[instrument(skip(self))]
    pub async fn mark_ready(&self, key: ItemKey, station: &str) -> Result<ItemStatus, RoutingError> {
        let status = self
            .items
            .mark_ready(key, station.to_string(), self.clock.now())
            .await?;
        self.live.publish(KitchenEvent::ItemAdvanced {
            key,
            branch: status.branch.clone(),
            from: station.to_string(),
            to: status.current_station().map(str::to_string),
        });

        if status.stage == ItemStage::Completed {
            self.complete_if_done(key.order_id, &status.branch).await?;
        }
        Ok(status)
    }

    /// Completes an item without station data once someone has handled it by hand.
    /// Completing the last item completes the order.
    #[instrument(skip(self))]
    pub async fn resolve_manually(&self, key: ItemKey) -> Result<ItemStatus, RoutingError> {
        let status = self.items.resolve(key, self.clock.now()).await?;
        self.live.publish(KitchenEvent::ItemAdvanced {
            key,
            branch: status.branch.clone(),
            from: UNASSIGNED.to_string(),
            to: None,
        });
        self.complete_if_done(key.order_id, &status.branch).await?;
        Ok(status)
    }

    async fn complete_if_done(&self, order_id: OrderId, branch: &str) -> Result<(), RoutingError> {
        let order = self.order(order_id).await?;
        let statuses = self.statuses_of(&order).await?;
        let done = statuses.len() == order.items.len()
            && statuses.iter().all(|s| s.stage == ItemStage::Completed);
        if done && self.orders.complete(order_id).await? {
            info!(%order_id, "Order completed");
            self.live.publish(KitchenEvent::OrderCompleted {
                order_id,
                branch: branch.to_string(),
            });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn order_progress(&self, order_id: OrderId) -> Result<OrderProgress, RoutingError> {
        let order = self.order(order_id).await?;
        let statuses = self.statuses_of(&order).await?;

        let items = statuses
            .iter()
            .map(|s| ItemProgress {
                index: s.key.index,
                product: s.product.clone(),
                stage: s.stage,
                station: s.current_station().map(str::to_string),
            })
            .collect();

        Ok(OrderProgress {
            order_id,
            status: order.status,
            stage: progress_stage(&statuses),
            items,
        })
    }

    /// Items currently listed at `station`, in arrival order.
    pub async fn station_queue(&self, branch: &str, station: &str) -> Result<Vec<ItemStatus>, RoutingError> {
        let board = self.boards.board(branch).await?;
        self.resolve(board.queue(station)).await
    }

    /// Items without station data, waiting for manual handling.
    pub async fn unassigned(&self, branch: &str) -> Result<Vec<ItemStatus>, RoutingError> {
        let board = self.boards.board(branch).await?;
        self.resolve(&board.unassigned).await
    }

    pub async fn board(&self, branch: &str) -> Result<StationBoard, RoutingError> {
        Ok(self.boards.board(branch).await?)
    }

    /// The board as derived from the branch's item statuses alone.
    pub async fn derived_board(&self, branch: &str) -> Result<StationBoard, RoutingError> {
        let mut board = StationBoard {
            branch: branch.to_string(),
            ..StationBoard::default()
        };
        for entry in self.derived_entries(branch).await? {
            board.place(entry.key, entry.placement);
        }
        Ok(board)
    }

    /// Recomputes the branch's board from item statuses and reconciles the live one
    /// with it. Moves that land while the statuses are being read win over the
    /// older entries computed here.
    #[instrument(skip(self))]
    pub async fn rebuild_assignments(&self, branch: &str) -> Result<StationBoard, RoutingError> {
        let entries = self.derived_entries(branch).await?;
        let count = entries.len();
        self.boards.reconcile(branch, entries).await?;
        let rebuilt = self.boards.board(branch).await?;
        info!(branch, items = count, stations = rebuilt.stations.len(), "Station board rebuilt");
        Ok(rebuilt)
    }

    /// One entry per item status of `branch`, oldest first.
    async fn derived_entries(&self, branch: &str) -> Result<Vec<BoardEntry>, RoutingError> {
        let mut statuses: Vec<_> = self
            .items
            .fetch_all()
            .await?
            .into_iter()
            .filter(|s| s.branch == branch)
            .collect();
        statuses.sort_by(|a, b| (a.created_at, a.key).cmp(&(b.created_at, b.key)));
        Ok(statuses
            .iter()
            .map(|status| BoardEntry {
                key: status.key,
                placement: status.placement(),
            })
            .collect())
    }

    async fn order(&self, order_id: OrderId) -> Result<Order, RoutingError> {
        self.orders
            .fetch(order_id)
            .await?
            .ok_or_else(|| RoutingError::OrderNotFound(order_id.to_string()))
    }

    /// Item statuses of `order` that exist so far, by index.
    async fn statuses_of(&self, order: &Order) -> Result<Vec<ItemStatus>, RoutingError> {
        let keys: Vec<_> = (0u32..)
            .take(order.items.len())
            .map(|index| ItemKey::new(order.id, index))
            .collect();
        self.resolve(&keys).await
    }

    async fn resolve(&self, keys: &[ItemKey]) -> Result<Vec<ItemStatus>, RoutingError> {
        let mut statuses = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(status) = self.items.fetch(*key).await? {
                statuses.push(status);
            }
        }
        Ok(statuses)
    }
}

fn progress_stage(statuses: &[ItemStatus]) -> ProgressStage {
    if statuses.is_empty() {
        return ProgressStage::Queued;
    }
    if statuses.iter().all(|s| s.stage == ItemStage::Completed) {
        return ProgressStage::Completed;
    }
    let unroutable: Vec<u32> = statuses
        .iter()
        .filter(|s| s.unroutable && s.stage != ItemStage::Completed)
        .map(|s| s.key.index)
        .collect();
    if !unroutable.is_empty() {
        return ProgressStage::NeedsAttention { unroutable };
    }

    let active = statuses.iter().filter(|s| s.stage.is_active());
    let current_stage = active
        .clone()
        .min_by_key(|s| s.station_index)
        .and_then(|s| s.current_station())
        .unwrap_or_default()
        .to_string();
    let stations: BTreeSet<&str> = active.filter_map(|s| s.current_station()).collect();
    ProgressStage::InProgress {
        current_stage,
        stations: stations.into_iter().map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn status(index: u32, stations: &[&str], station_index: usize, stage: ItemStage) -> ItemStatus {
        ItemStatus {
            key: ItemKey::new(OrderId::new(), index),
            branch: "main".into(),
            product: "burger".into(),
            bundle: None,
            stations: stations.iter().map(|s| s.to_string()).collect(),
            station_index,
            stage,
            unroutable: stations.is_empty(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn progress_names_the_earliest_active_station() {
        let stage = progress_stage(&[
            status(0, &["prep", "grill", "pack"], 2, ItemStage::Pending),
            status(1, &["prep", "fryer", "pack"], 1, ItemStage::Preparing),
            status(2, &["prep"], 0, ItemStage::Completed),
        ]);
        assert_eq!(
            stage,
            ProgressStage::InProgress {
                current_stage: "fryer".into(),
                stations: vec!["fryer".into(), "pack".into()],
            }
        );
    }

    #[test]
    fn unfinished_unroutable_item_needs_attention() {
        let stage = progress_stage(&[
            status(0, &["grill"], 0, ItemStage::Pending),
            status(1, &[], 0, ItemStage::Pending),
        ]);
        assert_eq!(stage, ProgressStage::NeedsAttention { unroutable: vec![1] });
    }

    #[test]
    fn all_completed_and_nothing_routed() {
        assert_eq!(
            progress_stage(&[status(0, &["grill"], 0, ItemStage::Completed)]),
            ProgressStage::Completed
        );
        assert_eq!(progress_stage(&[]), ProgressStage::Queued);
    }
}
