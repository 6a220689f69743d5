//! The kitchen work queue: admitted orders waiting to be routed.

use super::StationRouter;
use crate::model::Order;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Routes every order received on `queue` until all senders are dropped.
pub fn spawn_router_worker(router: StationRouter, mut queue: mpsc::Receiver<Order>) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Router worker started");
        while let Some(order) = queue.recv().await {
            if let Err(e) = router.assign_order_to_stations(&order).await {
                error!(order_id = %order.id, error = %e, "Routing failed");
            }
        }
        info!("Router worker stopped");
    })
}
