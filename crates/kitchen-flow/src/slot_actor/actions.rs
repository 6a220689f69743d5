//! Custom actions for the capacity slot actor.
//!
//! Both actions are a test-and-mutate inside one message, so they are atomic with
//! respect to every other request for the same slot.

/// Operations on a [`CapacitySlot`](crate::model::CapacitySlot).
#[derive(Debug, Clone)]
pub enum SlotAction {
    /// Takes one order and `items` production units, or fails without changing anything.
    ///
    /// # Errors
    /// `Full` when either limit would be exceeded, `ZeroCapacity` for a slot that admits
    /// nothing.
    Reserve { items: u32 },
    /// Gives back a reservation made earlier (order persistence failed after it).
    Release { items: u32 },
}

/// Counters after the action was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotUsage {
    pub reserved_orders: u32,
    pub reserved_items: u32,
}

/// Results from SlotActions - variants match 1:1 with SlotAction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotActionResult {
    Reserved(SlotUsage),
    Released(SlotUsage),
}
