//! # HTTP Transport
//!
//! JSON surface over the kitchen: order intake, station operator actions, display
//! queues, slot overview, menu reload and a server-sent event stream of live events.
//! Handlers only translate; all behaviour lives in the pipeline and the router.

mod error;
mod handlers;

pub use error::*;
pub use handlers::{MenuReloaded, StationBody};

use crate::clients::{InventoryClient, OrderClient};
use crate::intake::IntakePipeline;
use crate::lifecycle::KitchenSystem;
use crate::menu::MenuCatalog;
use crate::publish::LiveFeed;
use crate::routing::StationRouter;
use crate::scheduler::SlotScheduler;
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<IntakePipeline>,
    pub router: StationRouter,
    pub scheduler: SlotScheduler,
    pub orders: OrderClient,
    pub inventory: InventoryClient,
    pub menu: Arc<MenuCatalog>,
    pub live: LiveFeed,
    pub menu_path: PathBuf,
}

impl AppState {
    pub fn new(system: &KitchenSystem, menu_path: impl Into<PathBuf>) -> Self {
        Self {
            intake: system.intake.clone(),
            router: system.router.clone(),
            scheduler: system.scheduler.clone(),
            orders: system.orders.clone(),
            inventory: system.inventory.clone(),
            menu: system.menu.clone(),
            live: system.live.clone(),
            menu_path: menu_path.into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let orders = Router::new()
        .route("/api/orders", post(handlers::submit_order))
        .route("/api/orders/{id}", get(handlers::get_order))
        .route("/api/orders/{id}/progress", get(handlers::order_progress));

    let stations = Router::new()
        .route(
            "/api/branches/{branch}/stations/{station}/items",
            get(handlers::station_items),
        )
        .route("/api/branches/{branch}/unassigned", get(handlers::unassigned_items))
        .route("/api/branches/{branch}/board", get(handlers::station_board))
        .route("/api/branches/{branch}/board/rebuild", post(handlers::rebuild_board))
        .route(
            "/api/branches/{branch}/stock",
            get(handlers::get_stock).put(handlers::put_stock),
        )
        .route("/api/items/{order_id}/{index}/claim", post(handlers::claim_item))
        .route("/api/items/{order_id}/{index}/ready", post(handlers::ready_item))
        .route("/api/items/{order_id}/{index}/resolve", post(handlers::resolve_item));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/slots/{date}", get(handlers::slots_for_day))
        .route("/api/menu/reload", post(handlers::reload_menu))
        .route("/api/live", get(handlers::live_events))
        .merge(orders)
        .merge(stations)
        .with_state(state)
}
