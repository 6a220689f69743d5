//! Wire shapes of order submission.

use crate::model::{Customer, DisplayId, Fulfilment, OrderId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct LineRequest {
    /// Product or bundle name.
    pub product: String,
    pub quantity: u32,
    #[serde(default)]
    pub extras: Vec<String>,
    /// Ingredients to leave out.
    #[serde(default)]
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    /// Defaults to the configured branch.
    #[serde(default)]
    pub branch: Option<String>,
    pub customer: Customer,
    #[serde(default = "pickup")]
    pub fulfilment: Fulfilment,
    pub items: Vec<LineRequest>,
    /// Client-quoted delivery fee; ignored for pickup.
    #[serde(default)]
    pub delivery_fee: Option<Decimal>,
    /// Absolute discount. Mutually exclusive with `discount_percent`.
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub discount_percent: Option<Decimal>,
}

fn pickup() -> Fulfilment {
    Fulfilment::Pickup
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderAck {
    pub order_id: OrderId,
    pub display_id: DisplayId,
    /// Items subtotal before delivery and discount.
    pub total_price: Decimal,
    pub final_price: Decimal,
    pub status: &'static str,
    pub slot_start: DateTime<Utc>,
    pub visible_at: DateTime<Utc>,
}
