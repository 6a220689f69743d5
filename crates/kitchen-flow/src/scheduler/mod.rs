//! # Slot Scheduler
//!
//! Finds the earliest capacity slot an order can be finished in and reserves it.
//!
//! The walk starts at `now` (or the next opening), rounded up to a slot boundary, and
//! runs to the business day's closing. A slot qualifies when the order's estimated
//! prep time still fits before the slot ends; the first such slot that accepts the
//! reservation wins. Each reservation is one `ensure_action` message to the slot's
//! owning shard, so two orders racing for the last unit of a slot are decided by that
//! shard alone.

mod error;

pub use error::*;

use crate::clients::SlotClient;
use crate::clock::Clock;
use crate::model::{CapacityConfig, CapacitySlot, OrderId, SlotCreate, SlotId};
use crate::slot_actor::SlotError;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use kitchen_actor::ActorClient;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotAssignment {
    pub slot_id: SlotId,
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
    /// When staff should start seeing the order.
    pub visible_at: DateTime<Utc>,
    #[serde(skip)]
    pub prep_time: Duration,
}

#[derive(Clone)]
pub struct SlotScheduler {
    slots: SlotClient,
    config: CapacityConfig,
    clock: Arc<dyn Clock>,
}

impl SlotScheduler {
    pub fn new(slots: SlotClient, config: CapacityConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            slots,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &CapacityConfig {
        &self.config
    }

    /// Reserves the earliest feasible slot with room for one more order of `item_count`
    /// units.
    #[instrument(skip(self, estimated_value))]
    pub async fn assign_slot(
        &self,
        order_id: OrderId,
        estimated_value: Decimal,
        item_count: u32,
    ) -> Result<SlotAssignment, ScheduleError> {
        let now = self.clock.now();
        let prep_time = self.config.prep.estimate(estimated_value, item_count);
        let (mut start, close) = self.search_window(now);
        let slot_length = self.config.slot_length();
        debug!(%start, %close, prep_minutes = prep_time.num_minutes(), "Searching slots");

        while start < close {
            let end = (start + slot_length).min(close);
            let slot_start = start;
            start = end;

            if now + prep_time > end {
                continue;
            }
            let params = SlotCreate {
                start: slot_start,
                end,
                max_orders: self.config.max_orders_per_slot,
                max_items: self.config.max_items_per_slot,
            };
            match self.slots.reserve(params, item_count).await {
                Ok(usage) => {
                    let visible_at = now.max((slot_start - prep_time).min(slot_start));
                    info!(
                        slot_id = %SlotId(slot_start),
                        %visible_at,
                        reserved_orders = usage.reserved_orders,
                        reserved_items = usage.reserved_items,
                        "Slot reserved"
                    );
                    return Ok(SlotAssignment {
                        slot_id: SlotId(slot_start),
                        slot_start,
                        slot_end: end,
                        visible_at,
                        prep_time,
                    });
                }
                Err(SlotError::Full { .. } | SlotError::ZeroCapacity(_)) => {
                    debug!(slot_id = %SlotId(slot_start), "Slot has no room");
                }
                Err(e) => return Err(ScheduleError::Slot(e)),
            }
        }

        warn!(item_count, "No slot with capacity before closing");
        Err(ScheduleError::CapacityExhausted)
    }

    /// Gives back a reservation made by [`assign_slot`](Self::assign_slot).
    #[instrument(skip(self))]
    pub async fn release(&self, slot_id: SlotId, item_count: u32) -> Result<(), ScheduleError> {
        let usage = self.slots.release(slot_id, item_count).await?;
        info!(
            reserved_orders = usage.reserved_orders,
            reserved_items = usage.reserved_items,
            "Slot released"
        );
        Ok(())
    }

    /// Re-applies a reservation recorded earlier, for replay. Returns `false` when the
    /// slot no longer has room; the order keeps its slot either way.
    #[instrument(skip(self))]
    pub async fn reinstate(
        &self,
        slot_start: DateTime<Utc>,
        item_count: u32,
    ) -> Result<bool, ScheduleError> {
        let day = self.config.business_date(slot_start);
        let close = self.local_to_utc(day, self.config.closing);
        let params = SlotCreate {
            start: slot_start,
            end: (slot_start + self.config.slot_length()).min(close),
            max_orders: self.config.max_orders_per_slot,
            max_items: self.config.max_items_per_slot,
        };
        match self.slots.reserve(params, item_count).await {
            Ok(_) => Ok(true),
            Err(e @ (SlotError::Full { .. } | SlotError::ZeroCapacity(_))) => {
                warn!(error = %e, "Replayed order exceeds slot capacity");
                Ok(false)
            }
            Err(e) => Err(ScheduleError::Slot(e)),
        }
    }

    /// Slots created so far for a business day, in start order.
    pub async fn slot_overview(&self, date: NaiveDate) -> Result<Vec<CapacitySlot>, ScheduleError> {
        let mut slots: Vec<_> = self
            .slots
            .fetch_all()
            .await?
            .into_iter()
            .filter(|slot| self.config.business_date(slot.start) == date)
            .collect();
        slots.sort_by_key(|slot| slot.start);
        Ok(slots)
    }

    /// First candidate slot start and the closing instant of that business day.
    fn search_window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let local = self.config.to_local(now);
        let today = local.date();
        let (day, from) = if local.time() < self.config.opening {
            (today, self.local_to_utc(today, self.config.opening))
        } else if local.time() >= self.config.closing {
            let tomorrow = today.succ_opt().unwrap_or(today);
            (tomorrow, self.local_to_utc(tomorrow, self.config.opening))
        } else {
            (today, now)
        };
        let opening = self.local_to_utc(day, self.config.opening);
        let close = self.local_to_utc(day, self.config.closing);
        (round_up(from, opening, self.config.slot_length()), close)
    }

    fn local_to_utc(&self, day: NaiveDate, time: chrono::NaiveTime) -> DateTime<Utc> {
        self.config.to_utc(NaiveDateTime::new(day, time))
    }
}

/// Smallest `origin + k × step` (k ≥ 0) at or after `at`.
fn round_up(at: DateTime<Utc>, origin: DateTime<Utc>, step: Duration) -> DateTime<Utc> {
    if at <= origin {
        return origin;
    }
    let step_ns = step.num_nanoseconds().unwrap_or(i64::MAX).max(1);
    let elapsed_ns = (at - origin).num_nanoseconds().unwrap_or(i64::MAX);
    let steps = elapsed_ns / step_ns + i64::from(elapsed_ns % step_ns != 0);
    origin + Duration::nanoseconds(steps.saturating_mul(step_ns))
}
