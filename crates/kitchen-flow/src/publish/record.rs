//! Compact binary records for downstream consumers.
//!
//! Amounts are integer minor units and instants are epoch milliseconds, so records
//! stay small and do not depend on how `Decimal` or `chrono` serialize.

use super::PublishError;
use crate::model::{
    Customer, DisplayId, Fulfilment, IngredientDose, Order, OrderId, OrderItem, OrderStatus,
    Pricing, SlotId,
};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub product: String,
    pub bundle: Option<String>,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub ingredients: Vec<IngredientDose>,
    pub extras: Vec<String>,
    pub excluded: Vec<String>,
    pub stations: Vec<String>,
}

/// Everything needed to rebuild an [`Order`] as it was admitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: Uuid,
    pub display_id: String,
    pub branch: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// `None` for pickup.
    pub delivery_address: Option<String>,
    pub items: Vec<ItemRecord>,
    pub items_subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub discount_cents: i64,
    pub final_total_cents: i64,
    pub slot_start_ms: i64,
    pub visible_at_ms: i64,
    pub created_at_ms: i64,
    pub status: OrderStatus,
}

/// One line per admitted order, for bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub order_id: Uuid,
    pub display_id: String,
    pub branch: String,
    pub final_total_cents: i64,
    pub unit_count: u32,
    pub slot_start_ms: i64,
    pub recorded_at_ms: i64,
}

impl OrderRecord {
    pub fn from_order(order: &Order) -> Result<Self, PublishError> {
        let items = order
            .items
            .iter()
            .map(|item| {
                Ok(ItemRecord {
                    product: item.product.clone(),
                    bundle: item.bundle.clone(),
                    quantity: item.quantity,
                    unit_price_cents: to_cents(item.unit_price)?,
                    ingredients: item.ingredients.clone(),
                    extras: item.extras.clone(),
                    excluded: item.excluded.clone(),
                    stations: item.stations.clone(),
                })
            })
            .collect::<Result<Vec<_>, PublishError>>()?;

        Ok(Self {
            order_id: order.id.0,
            display_id: order.display_id.0.clone(),
            branch: order.branch.clone(),
            customer_name: order.customer.name.clone(),
            phone: order.customer.phone.clone(),
            email: order.customer.email.clone(),
            delivery_address: match &order.fulfilment {
                Fulfilment::Pickup => None,
                Fulfilment::Delivery { address } => Some(address.clone()),
            },
            items,
            items_subtotal_cents: to_cents(order.pricing.items_subtotal)?,
            delivery_fee_cents: to_cents(order.pricing.delivery_fee)?,
            discount_cents: to_cents(order.pricing.discount)?,
            final_total_cents: to_cents(order.pricing.final_total)?,
            slot_start_ms: order.slot_start.timestamp_millis(),
            visible_at_ms: order.visible_at.timestamp_millis(),
            created_at_ms: order.created_at.timestamp_millis(),
            status: order.status,
        })
    }

    /// The order as admitted. Routing metadata is not part of the record.
    pub fn into_order(self) -> Result<Order, PublishError> {
        let slot_start = from_millis(self.slot_start_ms)?;
        let id = OrderId(self.order_id);
        Ok(Order {
            id,
            display_id: DisplayId(self.display_id),
            branch: self.branch,
            customer: Customer {
                name: self.customer_name,
                phone: self.phone,
                email: self.email,
            },
            fulfilment: match self.delivery_address {
                Some(address) => Fulfilment::Delivery { address },
                None => Fulfilment::Pickup,
            },
            items: self
                .items
                .into_iter()
                .map(|item| OrderItem {
                    product: item.product,
                    bundle: item.bundle,
                    quantity: item.quantity,
                    unit_price: from_cents(item.unit_price_cents),
                    ingredients: item.ingredients,
                    extras: item.extras,
                    excluded: item.excluded,
                    stations: item.stations,
                })
                .collect(),
            pricing: Pricing {
                items_subtotal: from_cents(self.items_subtotal_cents),
                delivery_fee: from_cents(self.delivery_fee_cents),
                discount: from_cents(self.discount_cents),
                final_total: from_cents(self.final_total_cents),
            },
            slot_id: SlotId(slot_start),
            slot_start,
            visible_at: from_millis(self.visible_at_ms)?,
            status: self.status,
            created_at: from_millis(self.created_at_ms)?,
            routed_at: None,
            unroutable_items: Vec::new(),
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, PublishError> {
        bincode::serialize(self).map_err(|e| PublishError::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PublishError> {
        bincode::deserialize(bytes).map_err(|e| PublishError::Corrupt(e.to_string()))
    }
}

impl AuditEntry {
    pub fn for_order(order: &Order, recorded_at: DateTime<Utc>) -> Result<Self, PublishError> {
        Ok(Self {
            order_id: order.id.0,
            display_id: order.display_id.0.clone(),
            branch: order.branch.clone(),
            final_total_cents: to_cents(order.pricing.final_total)?,
            unit_count: order.unit_count(),
            slot_start_ms: order.slot_start.timestamp_millis(),
            recorded_at_ms: recorded_at.timestamp_millis(),
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, PublishError> {
        bincode::serialize(self).map_err(|e| PublishError::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PublishError> {
        bincode::deserialize(bytes).map_err(|e| PublishError::Corrupt(e.to_string()))
    }
}

fn to_cents(amount: Decimal) -> Result<i64, PublishError> {
    (amount * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| PublishError::Encode(format!("amount {amount} out of range")))
}

fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, PublishError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| PublishError::Corrupt(format!("timestamp {ms} out of range")))
}
