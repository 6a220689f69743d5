//! Custom actions for the inventory actor.

use std::collections::HashMap;

/// Operations on a [`BranchStock`](crate::model::BranchStock).
#[derive(Debug, Clone)]
pub enum InventoryAction {
    /// Verifies every ingredient has at least the requested grams. Read-only.
    ///
    /// # Errors
    /// `Insufficient` naming the first short ingredient (alphabetical).
    Check { required: HashMap<String, u64> },
}

/// Results from InventoryActions - variants match 1:1 with InventoryAction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryActionResult {
    Available,
}
