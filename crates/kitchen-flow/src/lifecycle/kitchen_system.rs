use super::sweep::VisibilitySweep;
use crate::clients::{InventoryClient, ItemStatusClient, OrderClient, SlotClient, StationBoardClient};
use crate::clock::Clock;
use crate::config::{Config, ConfigError};
use crate::intake::{FanOut, IntakePipeline};
use crate::inventory_actor::InventoryError;
use crate::menu::{MenuCatalog, MenuError};
use crate::model::{MenuDocument, OrderStatus};
use crate::publish::{
    EventLog, FileEventLog, LiveFeed, MemoryEventLog, OrderRecord, PublishError, RetryPolicy,
};
use crate::routing::{spawn_router_worker, StationRouter};
use crate::scheduler::SlotScheduler;
use kitchen_actor::ResourceActor;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const LIVE_FEED_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Menu(#[from] MenuError),

    #[error("Seeding stock failed: {0}")]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("Task failed during shutdown: {0}")]
    Task(String),
}

/// The two append-only logs the fan-out writes to.
#[derive(Clone)]
pub struct EventLogs {
    pub orders: Arc<dyn EventLog>,
    pub audit: Arc<dyn EventLog>,
}

impl EventLogs {
    pub fn in_memory() -> Self {
        Self {
            orders: Arc::new(MemoryEventLog::new()),
            audit: Arc::new(MemoryEventLog::new()),
        }
    }

    pub async fn open(config: &Config) -> Result<Self, PublishError> {
        Ok(Self {
            orders: Arc::new(FileEventLog::open(config.order_log_path()).await?),
            audit: Arc::new(FileEventLog::open(config.audit_log_path()).await?),
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub records: usize,
    /// Orders that were missing from the store and have been restored.
    pub restored: usize,
    pub skipped: usize,
}

/// Runtime orchestrator of the kitchen.
///
/// Owns the clients of every actor and the handles of every task it spawned. Shutting
/// down stops the sweep, drops all clients so each actor's channel closes, and waits
/// for every task. Item status actors hold a board client in their context, so boards
/// stop after the last item shard; the dependency graph has no cycles.
pub struct KitchenSystem {
    pub intake: Arc<IntakePipeline>,
    pub router: StationRouter,
    pub scheduler: SlotScheduler,
    pub orders: OrderClient,
    pub inventory: InventoryClient,
    pub menu: Arc<MenuCatalog>,
    pub live: LiveFeed,
    pub sweep: VisibilitySweep,
    logs: EventLogs,
    stop_sweep: watch::Sender<bool>,
    sweep_handle: JoinHandle<()>,
    worker_handle: JoinHandle<()>,
    actor_handles: Vec<JoinHandle<()>>,
}

impl KitchenSystem {
    /// Spawns every actor, the router worker and the visibility sweep, and seeds branch
    /// stock from the menu document.
    pub async fn start(
        config: &Config,
        menu: MenuDocument,
        clock: Arc<dyn Clock>,
        logs: EventLogs,
    ) -> Result<Self, SystemError> {
        config.validate()?;
        let catalog = Arc::new(MenuCatalog::from_document(&menu)?);
        let (shards, buffer) = (config.actor_shards, config.actor_buffer);
        let mut actor_handles = Vec::new();

        // 1. Actors without dependencies
        let (slot_actors, slot_client) = crate::slot_actor::new(shards, buffer);
        let (order_actors, order_client) = crate::order_actor::new(shards, buffer);
        let (board_actors, board_client) = crate::station_actor::new(shards, buffer);
        let (inventory_actor, inventory_client) = crate::inventory_actor::new(buffer);
        actor_handles.extend(spawn_all(slot_actors, ()));
        actor_handles.extend(spawn_all(order_actors, ()));
        actor_handles.extend(spawn_all(board_actors, ()));
        actor_handles.push(tokio::spawn(inventory_actor.run(())));

        // 2. Item statuses keep the station boards in step
        let boards = StationBoardClient::new(board_client);
        let (item_actors, item_client) = crate::item_actor::new(shards, buffer);
        actor_handles.extend(spawn_all(item_actors, boards.clone()));

        let orders = OrderClient::new(order_client);
        let inventory = InventoryClient::new(inventory_client);
        let live = LiveFeed::new(LIVE_FEED_CAPACITY);

        for (branch, grams) in menu.stock {
            inventory.restock(&branch, grams).await?;
        }

        let scheduler = SlotScheduler::new(
            SlotClient::new(slot_client),
            config.capacity.clone(),
            clock.clone(),
        );
        let router = StationRouter::new(
            ItemStatusClient::new(item_client),
            boards,
            orders.clone(),
            live.clone(),
            clock.clone(),
        );

        // 3. Background workers
        let (queue_tx, queue_rx) = mpsc::channel(buffer);
        let worker_handle = spawn_router_worker(router.clone(), queue_rx);

        let fanout = FanOut::new(
            logs.orders.clone(),
            logs.audit.clone(),
            queue_tx.clone(),
            live.clone(),
            clock.clone(),
        )
        .with_retry(RetryPolicy::with_max_retries(config.retry_max))
        .with_timeout(config.fanout_timeout);

        let intake = IntakePipeline::new(
            catalog.clone(),
            scheduler.clone(),
            orders.clone(),
            inventory.clone(),
            fanout,
            clock.clone(),
        )
        .with_inventory_check(config.inventory_check)
        .with_default_branch(config.default_branch.clone());

        let sweep = VisibilitySweep::new(orders.clone(), queue_tx, live.clone(), clock);
        let (stop_sweep, stop_rx) = watch::channel(false);
        let sweep_handle = sweep.clone().spawn(config.sweep_interval, stop_rx);

        info!(shards, buffer, actors = actor_handles.len(), "Kitchen system started");
        Ok(Self {
            intake: Arc::new(intake),
            router,
            scheduler,
            orders,
            inventory,
            menu: catalog,
            live,
            sweep,
            logs,
            stop_sweep,
            sweep_handle,
            worker_handle,
            actor_handles,
        })
    }

    /// Re-feeds every recorded order into the order store and the router. Orders
    /// already present are only re-routed, which is a no-op for them. Slot
    /// reservations are reinstated for restored orders; station progress is not
    /// recorded, so restored items start again at their first station. Orders that
    /// were not visible yet are left to the sweep.
    pub async fn replay(&self) -> Result<ReplaySummary, SystemError> {
        let frames = self.logs.orders.read_all().await?;
        let mut summary = ReplaySummary {
            records: frames.len(),
            ..ReplaySummary::default()
        };

        for frame in frames {
            let order = match OrderRecord::decode(&frame).and_then(OrderRecord::into_order) {
                Ok(order) => order,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable order record");
                    summary.skipped += 1;
                    continue;
                }
            };
            let order_id = order.id;
            match self.orders.ensure_order(order.clone()).await {
                Ok(true) => {
                    summary.restored += 1;
                    if let Err(e) = self.scheduler.reinstate(order.slot_start, order.unit_count()).await {
                        warn!(%order_id, error = %e, "Slot reservation not reinstated");
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(%order_id, error = %e, "Skipping order the store rejected");
                    summary.skipped += 1;
                    continue;
                }
            }
            if order.status == OrderStatus::Accepted {
                continue;
            }
            if let Err(e) = self.router.assign_order_to_stations(&order).await {
                error!(%order_id, error = %e, "Replay routing failed");
            }
        }

        info!(
            records = summary.records,
            restored = summary.restored,
            skipped = summary.skipped,
            "Replay finished"
        );
        Ok(summary)
    }

    /// Gracefully shuts down the whole system.
    ///
    /// Callers must have dropped every clone they took of the clients (an HTTP router's
    /// state, for instance); otherwise the matching actors keep running and this waits.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down kitchen system...");
        let Self {
            intake,
            router,
            scheduler,
            orders,
            inventory,
            menu,
            live,
            sweep,
            logs,
            stop_sweep,
            sweep_handle,
            worker_handle,
            actor_handles,
        } = self;

        // Step 1: stop the sweep, then drop both queue senders (sweep and intake) so
        // the router worker drains and exits. Fan-out tasks still running hold their
        // own sender until they finish or hit their budget.
        let _ = stop_sweep.send(true);
        join("visibility sweep", sweep_handle).await?;
        drop(sweep);
        drop(intake);
        join("router worker", worker_handle).await?;

        // Step 2: close every actor channel
        drop(router);
        drop(scheduler);
        drop(orders);
        drop(inventory);
        drop((menu, live, logs));

        for handle in actor_handles {
            join("actor", handle).await?;
        }
        info!("Kitchen system shut down");
        Ok(())
    }
}

fn spawn_all<T>(actors: Vec<ResourceActor<T>>, context: T::Context) -> Vec<JoinHandle<()>>
where
    T: kitchen_actor::ActorEntity,
    T::Context: Clone,
{
    actors
        .into_iter()
        .map(|actor| tokio::spawn(actor.run(context.clone())))
        .collect()
}

async fn join(what: &str, handle: JoinHandle<()>) -> Result<(), SystemError> {
    handle.await.map_err(|e| {
        error!(task = what, error = %e, "Task panicked");
        SystemError::Task(format!("{what}: {e}"))
    })
}
