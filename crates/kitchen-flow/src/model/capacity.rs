//! Capacity model: opening hours, slot granularity, per-slot limits and the prep-time
//! estimate. Pure data; the scheduler and the slot actor read it, nothing mutates it.

use crate::config::ConfigError;
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Parameters of the preparation-time estimate:
/// `base + per_item × items + per_value_step × ⌊value / value_step⌋` minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct PrepTimeModel {
    pub base_minutes: i64,
    pub per_item_minutes: i64,
    /// Monetary step; zero disables the value term.
    pub value_step: Decimal,
    pub per_value_step_minutes: i64,
}

impl PrepTimeModel {
    pub fn estimate(&self, order_value: Decimal, item_count: u32) -> Duration {
        let steps = if self.value_step > Decimal::ZERO && order_value > Decimal::ZERO {
            (order_value / self.value_step).floor().to_i64().unwrap_or(0)
        } else {
            0
        };
        Duration::minutes(
            self.base_minutes
                + self.per_item_minutes * i64::from(item_count)
                + self.per_value_step_minutes * steps,
        )
    }
}

impl Default for PrepTimeModel {
    fn default() -> Self {
        Self {
            base_minutes: 5,
            per_item_minutes: 2,
            value_step: Decimal::new(25, 0),
            per_value_step_minutes: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapacityConfig {
    /// Local opening time of the business day.
    pub opening: NaiveTime,
    /// Local closing time; no slot starts at or after it.
    pub closing: NaiveTime,
    pub slot_minutes: u32,
    pub max_orders_per_slot: u32,
    pub max_items_per_slot: u32,
    /// Fixed offset of business-local time from UTC.
    pub utc_offset_minutes: i32,
    pub prep: PrepTimeModel,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            opening: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            closing: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
            slot_minutes: 15,
            max_orders_per_slot: 8,
            max_items_per_slot: 24,
            utc_offset_minutes: 0,
            prep: PrepTimeModel::default(),
        }
    }
}

impl CapacityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.opening >= self.closing {
            return Err(ConfigError::Inconsistent(format!(
                "opening {} must be before closing {}",
                self.opening, self.closing
            )));
        }
        if self.slot_minutes == 0 {
            return Err(ConfigError::Inconsistent("slot length must be positive".into()));
        }
        if FixedOffset::east_opt(self.utc_offset_minutes * 60).is_none() {
            return Err(ConfigError::Inconsistent(format!(
                "utc offset {} minutes is out of range",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    pub fn slot_length(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    /// UTC instant of a business-local wall time.
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let shifted = local - Duration::seconds(i64::from(self.offset().local_minus_utc()));
        Utc.from_utc_datetime(&shifted)
    }

    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset()).naive_local()
    }

    /// Business day an instant belongs to (local calendar date).
    pub fn business_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.to_local(instant).date()
    }
}

/// Identifier of a capacity slot: its UTC start instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub DateTime<Utc>);

impl Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%MZ"))
    }
}

/// A fixed window of production capacity, created the first time a reservation
/// targets it.
///
/// Invariant: `reserved_orders ≤ max_orders` and `reserved_items ≤ max_items`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacitySlot {
    pub id: SlotId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reserved_orders: u32,
    pub reserved_items: u32,
    pub max_orders: u32,
    pub max_items: u32,
}

impl CapacitySlot {
    pub fn is_zero_capacity(&self) -> bool {
        self.max_orders == 0 || self.max_items == 0
    }

    pub fn fits(&self, items: u32) -> bool {
        self.reserved_orders < self.max_orders
            && self
                .reserved_items
                .checked_add(items)
                .is_some_and(|total| total <= self.max_items)
    }
}

/// Payload that creates a slot lazily.
#[derive(Debug, Clone)]
pub struct SlotCreate {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub max_orders: u32,
    pub max_items: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_grows_with_items_and_value() {
        let prep = PrepTimeModel {
            base_minutes: 5,
            per_item_minutes: 2,
            value_step: Decimal::new(20, 0),
            per_value_step_minutes: 3,
        };
        // 5 + 2*3 + 3*floor(45/20)
        assert_eq!(prep.estimate(Decimal::new(45, 0), 3), Duration::minutes(17));
        assert_eq!(prep.estimate(Decimal::ZERO, 0), Duration::minutes(5));
    }

    #[test]
    fn zero_value_step_disables_value_term() {
        let prep = PrepTimeModel {
            value_step: Decimal::ZERO,
            ..PrepTimeModel::default()
        };
        assert_eq!(prep.estimate(Decimal::new(1000, 0), 1), Duration::minutes(7));
    }

    #[test]
    fn local_and_utc_conversions_use_the_offset() {
        let config = CapacityConfig {
            utc_offset_minutes: 120,
            ..CapacityConfig::default()
        };
        let local = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let utc = config.to_utc(local);
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap());
        assert_eq!(config.to_local(utc), local);
    }

    #[test]
    fn validate_rejects_inverted_hours() {
        let config = CapacityConfig {
            opening: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            closing: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            ..CapacityConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn slot_fit_checks_both_limits() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let slot = CapacitySlot {
            id: SlotId(start),
            start,
            end: start + Duration::minutes(15),
            reserved_orders: 1,
            reserved_items: 4,
            max_orders: 2,
            max_items: 5,
        };
        assert!(slot.fits(1));
        assert!(!slot.fits(2));
    }
}
