//! Custom actions for the order store.
//!
//! An order body never changes; these are the only mutations allowed and each one
//! reports whether it changed anything, so replays and repeated sweeps are harmless.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// `accepted → active` once the order becomes visible to staff.
    Activate,
    /// Records that the station router has processed the order.
    MarkRouted {
        at: DateTime<Utc>,
        unroutable: Vec<u32>,
    },
    /// Every item has left its last station.
    Complete,
}
