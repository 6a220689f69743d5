//! Custom actions for the station board actor.

use crate::model::{BoardEntry, ItemKey, Placement};

#[derive(Debug, Clone)]
pub enum StationAction {
    /// Lists `key` at `to`, off every other list, in one message so the key is never
    /// seen twice. Ignored when the board already saw the item further along.
    Place { key: ItemKey, to: Placement },
    /// Applies a board recomputed from item statuses, entry by entry, under the same
    /// rule. Items without an entry are left as they are.
    Reconcile { entries: Vec<BoardEntry> },
}
