use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::intake::{OrderAck, OrderRequest};
use crate::model::{BranchStock, CapacitySlot, ItemKey, ItemStatus, Order, OrderId, StationBoard};
use crate::publish::KitchenEvent;
use crate::routing::OrderProgress;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use chrono::NaiveDate;
use futures::Stream;
use kitchen_actor::ActorClient;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct StationBody {
    pub station: String,
}

#[derive(Debug, Serialize)]
pub struct MenuReloaded {
    pub products: usize,
    pub extras: usize,
    pub bundles: usize,
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /api/orders
///
/// Admission runs detached from the request, so a client that hangs up mid-way
/// cannot strand a reservation or skip the fan-out.
pub async fn submit_order(
    State(state): State<AppState>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderAck>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::invalid_request(e.body_text()))?;
    let ack = state
        .intake
        .spawn_submit(request)
        .await
        .map_err(ApiError::internal)??;
    Ok((StatusCode::CREATED, Json(ack)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Order> {
    let id = parse_order_id(&id)?;
    state
        .orders
        .fetch(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Order not found: {id}")))
}

/// GET /api/orders/{id}/progress
pub async fn order_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<OrderProgress> {
    let id = parse_order_id(&id)?;
    Ok(Json(state.router.order_progress(id).await?))
}

/// GET /api/branches/{branch}/stations/{station}/items
pub async fn station_items(
    State(state): State<AppState>,
    Path((branch, station)): Path<(String, String)>,
) -> ApiResult<Vec<ItemStatus>> {
    Ok(Json(state.router.station_queue(&branch, &station).await?))
}

/// GET /api/branches/{branch}/unassigned
pub async fn unassigned_items(
    State(state): State<AppState>,
    Path(branch): Path<String>,
) -> ApiResult<Vec<ItemStatus>> {
    Ok(Json(state.router.unassigned(&branch).await?))
}

/// GET /api/branches/{branch}/board
pub async fn station_board(
    State(state): State<AppState>,
    Path(branch): Path<String>,
) -> ApiResult<StationBoard> {
    Ok(Json(state.router.board(&branch).await?))
}

/// POST /api/branches/{branch}/board/rebuild
pub async fn rebuild_board(
    State(state): State<AppState>,
    Path(branch): Path<String>,
) -> ApiResult<StationBoard> {
    Ok(Json(state.router.rebuild_assignments(&branch).await?))
}

/// GET /api/branches/{branch}/stock
pub async fn get_stock(
    State(state): State<AppState>,
    Path(branch): Path<String>,
) -> ApiResult<BranchStock> {
    state
        .inventory
        .fetch(branch.clone())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No stock recorded for branch {branch}")))
}

/// PUT /api/branches/{branch}/stock
pub async fn put_stock(
    State(state): State<AppState>,
    Path(branch): Path<String>,
    body: Result<Json<HashMap<String, u64>>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(grams) = body.map_err(|e| ApiError::invalid_request(e.body_text()))?;
    info!(%branch, ingredients = grams.len(), "Restocking branch");
    state.inventory.restock(&branch, grams).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/items/{order_id}/{index}/claim
pub async fn claim_item(
    State(state): State<AppState>,
    Path((order_id, index)): Path<(String, u32)>,
    body: Result<Json<StationBody>, JsonRejection>,
) -> ApiResult<ItemStatus> {
    let key = ItemKey::new(parse_order_id(&order_id)?, index);
    let Json(body) = body.map_err(|e| ApiError::invalid_request(e.body_text()))?;
    Ok(Json(state.router.claim(key, &body.station).await?))
}

/// POST /api/items/{order_id}/{index}/ready
pub async fn ready_item(
    State(state): State<AppState>,
    Path((order_id, index)): Path<(String, u32)>,
    body: Result<Json<StationBody>, JsonRejection>,
) -> ApiResult<ItemStatus> {
    let key = ItemKey::new(parse_order_id(&order_id)?, index);
    let Json(body) = body.map_err(|e| ApiError::invalid_request(e.body_text()))?;
    Ok(Json(state.router.mark_ready(key, &body.station).await?))
}

/// POST /api/items/{order_id}/{index}/resolve
///
/// Completes an item without station data that was handled by hand.
pub async fn resolve_item(
    State(state): State<AppState>,
    Path((order_id, index)): Path<(String, u32)>,
) -> ApiResult<ItemStatus> {
    let key = ItemKey::new(parse_order_id(&order_id)?, index);
    Ok(Json(state.router.resolve_manually(key).await?))
}

/// GET /api/slots/{date}
pub async fn slots_for_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Vec<CapacitySlot>> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| ApiError::invalid_request(format!("Expected a YYYY-MM-DD date, got {date}")))?;
    Ok(Json(state.scheduler.slot_overview(date).await?))
}

/// POST /api/menu/reload
pub async fn reload_menu(State(state): State<AppState>) -> ApiResult<MenuReloaded> {
    let document = state.menu.reload(&state.menu_path).await?;
    Ok(Json(MenuReloaded {
        products: document.products.len(),
        extras: document.extras.len(),
        bundles: document.bundles.len(),
    }))
}

/// GET /api/live
pub async fn live_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut events = state.live.subscribe();
    debug!("Live subscriber connected");

    let stream = async_stream::stream! {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(sse) = to_sse(&event) {
                        yield Ok(sse);
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Live subscriber fell behind");
                    yield Ok(Event::default().event("lagged").data(missed.to_string()));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse(event: &KitchenEvent) -> Option<Event> {
    match Event::default().event(event.name()).json_data(event) {
        Ok(sse) => Some(sse),
        Err(e) => {
            warn!(error = %e, event = event.name(), "Dropping unencodable live event");
            None
        }
    }
}

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    Uuid::parse_str(raw)
        .map(OrderId::from)
        .map_err(|_| ApiError::invalid_request(format!("Not an order id: {raw}")))
}
