//! Authoritative per-item routing state, keyed by `(order id, item index)`.

use crate::model::{OrderId, Placement};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub order_id: OrderId,
    pub index: u32,
}

impl ItemKey {
    pub fn new(order_id: OrderId, index: u32) -> Self {
        Self { order_id, index }
    }
}

impl Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.order_id, self.index)
    }
}

/// Coarse production stage of an item.
///
/// `Ready` is what an operator signals at a station; it is never stored. Handling it
/// moves the item on to `Pending` at the next station, or to `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStage {
    Pending,
    Preparing,
    Ready,
    Completed,
}

impl ItemStage {
    /// Still waiting at or being worked on at a station.
    pub fn is_active(self) -> bool {
        matches!(self, ItemStage::Pending | ItemStage::Preparing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemStatus {
    pub key: ItemKey,
    pub branch: String,
    pub product: String,
    pub bundle: Option<String>,
    /// Copied from the order item; never re-derived from the menu.
    pub stations: Vec<String>,
    pub station_index: usize,
    pub stage: ItemStage,
    /// No station data: handled manually, listed in the branch's unassigned view.
    pub unroutable: bool,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ItemStatus {
    /// Station currently holding the item, if any.
    pub fn current_station(&self) -> Option<&str> {
        if self.stage == ItemStage::Completed {
            return None;
        }
        self.stations.get(self.station_index).map(String::as_str)
    }

    pub fn next_station(&self) -> Option<&str> {
        self.stations.get(self.station_index + 1).map(String::as_str)
    }

    /// Where the station board should list this item.
    pub fn placement(&self) -> Placement {
        if self.unroutable && self.stage != ItemStage::Completed {
            return Placement::Unassigned;
        }
        match self.current_station() {
            Some(station) => Placement::Station {
                station: station.to_string(),
                index: self.station_index,
            },
            None => Placement::Done,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ItemStatusCreate {
    pub key: ItemKey,
    pub branch: String,
    pub product: String,
    pub bundle: Option<String>,
    pub stations: Vec<String>,
    pub created_at: DateTime<Utc>,
}
