//! Promotes accepted orders to active once their `visible_at` has passed, and only
//! then hands them to the kitchen queue for routing.

use crate::clients::OrderClient;
use crate::clock::Clock;
use crate::model::{Order, OrderStatus};
use crate::order_actor::OrderError;
use crate::publish::{KitchenEvent, LiveFeed};
use chrono::{DateTime, Utc};
use kitchen_actor::ActorClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct VisibilitySweep {
    orders: OrderClient,
    kitchen_queue: mpsc::Sender<Order>,
    live: LiveFeed,
    clock: Arc<dyn Clock>,
}

impl VisibilitySweep {
    pub fn new(
        orders: OrderClient,
        kitchen_queue: mpsc::Sender<Order>,
        live: LiveFeed,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            kitchen_queue,
            live,
            clock,
        }
    }

    /// Activates every accepted order due at `now`. Returns how many changed.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<usize, OrderError> {
        let due: Vec<_> = self
            .orders
            .fetch_all()
            .await?
            .into_iter()
            .filter(|o| o.status == OrderStatus::Accepted && o.visible_at <= now)
            .collect();

        let mut activated = 0;
        for mut order in due {
            if self.orders.activate(order.id).await? {
                activated += 1;
                info!(order_id = %order.id, display_id = %order.display_id, "Order visible");
                self.live.publish(KitchenEvent::OrderVisible {
                    order_id: order.id,
                    display_id: order.display_id.0.clone(),
                    branch: order.branch.clone(),
                });
                order.status = OrderStatus::Active;
                if self.kitchen_queue.send(order).await.is_err() {
                    warn!("Kitchen queue closed, activated order left unrouted");
                }
            }
        }
        Ok(activated)
    }

    /// Sweeps every `interval` until `stop` flips to `true` or its sender is dropped.
    pub fn spawn(self, interval: Duration, mut stop: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(?interval, "Visibility sweep started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match self.sweep_once(self.clock.now()).await {
                            Ok(0) => {}
                            Ok(n) => debug!(activated = n, "Sweep finished"),
                            Err(e) => warn!(error = %e, "Sweep failed"),
                        }
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Visibility sweep stopped");
        })
    }
}
