//! Station operator actions on an item.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum ItemAction {
    /// Operator starts work. Requires the item to be `pending` at `station`.
    Claim { station: String, at: DateTime<Utc> },
    /// Operator signals `ready` at `station`: the item moves on to the next station as
    /// `pending`, or becomes `completed` after its last one.
    MarkReady { station: String, at: DateTime<Utc> },
    /// Someone handled an item without station data by hand; it completes and leaves
    /// the unassigned list.
    Resolve { at: DateTime<Utc> },
}
