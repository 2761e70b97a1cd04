use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FIXED_MINIMUM_BUFFER_MINUTES: i64 = 120;
pub const BUFFER_PERCENT: i64 = 10;

/// The production time, or the start it implies, doesn't fit the calendar.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Production time is too long to schedule")]
pub struct ScheduleOverflow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItemEstimate {
    pub quantity: i64,
    pub minutes_per_unit: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductionSchedule {
    pub delivery_at: NaiveDateTime,
    pub total_minutes: i64,
    pub buffer_minutes: i64,
    pub production_start: NaiveDateTime,
}

impl ProductionSchedule {
    /// Schedule for a production time that is already known.
    pub fn for_total(
        delivery_at: NaiveDateTime,
        total_minutes: i64,
    ) -> Result<Self, ScheduleOverflow> {
        Ok(Self {
            delivery_at,
            total_minutes,
            buffer_minutes: compute_buffer(total_minutes),
            production_start: production_start(delivery_at, total_minutes)?,
        })
    }

    /// Schedule for `items` plus `known_minutes` of other work.
    pub fn for_items(
        delivery_at: NaiveDateTime,
        known_minutes: i64,
        items: &[OrderItemEstimate],
    ) -> Result<Self, ScheduleOverflow> {
        let total_minutes = total_duration(items)?
            .checked_add(known_minutes)
            .ok_or(ScheduleOverflow)?;

        Self::for_total(delivery_at, total_minutes)
    }
}

pub fn total_duration(items: &[OrderItemEstimate]) -> Result<i64, ScheduleOverflow> {
    items.iter().try_fold(0_i64, |total, item| {
        item.quantity
            .checked_mul(item.minutes_per_unit)
            .and_then(|minutes| total.checked_add(minutes))
            .ok_or(ScheduleOverflow)
    })
}

/// Slack added on top of the production time: 10% of it, rounded up to the
/// minute, but never less than two hours.
pub fn compute_buffer(total_minutes: i64) -> i64 {
    let scaled = i128::from(total_minutes) * i128::from(BUFFER_PERCENT);
    let share = scaled.div_euclid(100) + i128::from(scaled.rem_euclid(100) != 0);

    i64::try_from(share).map_or(i64::MAX, |share| share.max(FIXED_MINIMUM_BUFFER_MINUTES))
}

pub fn production_start(
    delivery_at: NaiveDateTime,
    total_minutes: i64,
) -> Result<NaiveDateTime, ScheduleOverflow> {
    total_minutes
        .checked_add(compute_buffer(total_minutes))
        .and_then(Duration::try_minutes)
        .and_then(|lead| delivery_at.checked_sub_signed(lead))
        .ok_or(ScheduleOverflow)
}

#[tracing::instrument(name = "costing.plan", skip(items), fields(items = items.len()))]
pub fn plan(
    delivery_at: NaiveDateTime,
    items: &[OrderItemEstimate],
) -> Result<ProductionSchedule, ScheduleOverflow> {
    ProductionSchedule::for_items(delivery_at, 0, items)
}

/// Parses the `2024-12-25T15:00` shape sent by datetime-local inputs, with or
/// without seconds.
pub fn parse_local_datetime(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let value = value.trim();

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map_or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"), Ok)
}
