//! Customer orders as admitted by the intake pipeline.
//!
//! An [`Order`] is immutable evidence of what was sold: after creation only `status`
//! and the routing metadata (`routed_at`, `unroutable_items`) change. Per-item
//! production progress lives in [`ItemStatus`](crate::model::ItemStatus) records.

use crate::model::{IngredientDose, SlotId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Globally unique order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for OrderId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Six-character code shown to customers and staff. Never used as a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayId(pub String);

// Crockford base32: no I, L, O, U.
const DISPLAY_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const DISPLAY_LEN: usize = 6;

impl From<&OrderId> for DisplayId {
    fn from(id: &OrderId) -> Self {
        let bits = id.0.as_u128();
        let mut folded = (bits as u64) ^ ((bits >> 64) as u64);
        folded ^= folded >> 30;
        folded ^= folded >> 60;

        let code = (0..DISPLAY_LEN)
            .map(|i| DISPLAY_ALPHABET[((folded >> (5 * i)) & 0x1f) as usize] as char)
            .collect();
        Self(code)
    }
}

impl Display for DisplayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `accepted` (admitted, not yet visible to staff) → `active` → `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Accepted,
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fulfilment {
    Pickup,
    Delivery { address: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One routable unit of an order, with its recipe frozen at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: String,
    /// Set when the item came from expanding a bundle line.
    pub bundle: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub ingredients: Vec<IngredientDose>,
    pub extras: Vec<String>,
    pub excluded: Vec<String>,
    pub stations: Vec<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    pub fn is_routable(&self) -> bool {
        !self.stations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub items_subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount: Decimal,
    pub final_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub display_id: DisplayId,
    pub branch: String,
    pub customer: Customer,
    pub fulfilment: Fulfilment,
    pub items: Vec<OrderItem>,
    pub pricing: Pricing,
    pub slot_id: SlotId,
    pub slot_start: DateTime<Utc>,
    pub visible_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub routed_at: Option<DateTime<Utc>>,
    pub unroutable_items: Vec<u32>,
}

impl Order {
    /// Production units the order occupies in its slot.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_id_is_deterministic() {
        let id = OrderId(Uuid::from_u128(0x6f1c_2d3e_4f50_4a1b_9c8d_7e6f_5a4b_3c2d));
        let first = DisplayId::from(&id);
        let second = DisplayId::from(&id);
        assert_eq!(first, second);
        assert_eq!(first.0.len(), 6);
        assert!(first.0.bytes().all(|b| DISPLAY_ALPHABET.contains(&b)));
    }

    #[test]
    fn display_ids_spread_across_orders() {
        let codes: std::collections::HashSet<_> = (0..200)
            .map(|_| DisplayId::from(&OrderId::new()).0)
            .collect();
        assert!(codes.len() > 190);
    }
}
