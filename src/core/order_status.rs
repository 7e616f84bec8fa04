//! Order lifecycle state machine.
//!
//! ```text
//! pending -> confirmed -> preparing -> out_for_delivery -> delivered
//!    |           |            |
//!    +-----------+------------+--> cancelled
//! ```
//!
//! `delivered` and `cancelled` are terminal and no status transitions to
//! itself. This module only decides; [`crate::core::order::update_order_status`]
//! applies the plan to the store with a conditional update.

use crate::{
    entities::order::{self, OrderStatus},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};

/// Delivery target for emergency orders, measured from creation.
pub const EMERGENCY_SLA_MINUTES: i64 = 30;

/// Statuses reachable in one step from `from`.
#[must_use]
pub const fn allowed_targets(from: OrderStatus) -> &'static [OrderStatus] {
    match from {
        OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
        OrderStatus::Confirmed => &[OrderStatus::Preparing, OrderStatus::Cancelled],
        OrderStatus::Preparing => &[OrderStatus::OutForDelivery, OrderStatus::Cancelled],
        OrderStatus::OutForDelivery => &[OrderStatus::Delivered],
        OrderStatus::Delivered | OrderStatus::Cancelled => &[],
    }
}

/// Whether `from -> to` is in the transition table.
#[must_use]
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// The writes a single accepted transition performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Status the order is in when the change is planned
    pub from: OrderStatus,
    /// Status being written
    pub to: OrderStatus,
    /// New `updated_at`
    pub updated_at: DateTime<Utc>,
    /// `estimated_delivery_time` to write, only when it was absent
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    /// `actual_delivery_time` to write on delivery
    pub actual_delivery_time: Option<DateTime<Utc>>,
}

/// Plans the transition of `current` to `to` at `now`.
///
/// `delivery_minutes` is the supplier's average delivery time, used for the
/// estimate when the order leaves for delivery; emergency orders are
/// estimated against the SLA instead.
///
/// # Errors
/// Returns [`Error::InvalidTransition`] when the pair is not in the table.
pub fn plan_transition(
    current: &order::Model,
    to: OrderStatus,
    now: DateTime<Utc>,
    delivery_minutes: i64,
) -> Result<StatusChange> {
    let from = current.status;
    if !can_transition(from, to) {
        return Err(Error::InvalidTransition { from, to });
    }

    let estimated_delivery_time = match to {
        OrderStatus::OutForDelivery if current.estimated_delivery_time.is_none() => {
            let minutes = if current.is_emergency {
                EMERGENCY_SLA_MINUTES
            } else {
                delivery_minutes.max(0)
            };
            Some(now + Duration::minutes(minutes))
        }
        _ => None,
    };

    let actual_delivery_time = (to == OrderStatus::Delivered).then_some(now);

    Ok(StatusChange {
        from,
        to,
        updated_at: now,
        estimated_delivery_time,
        actual_delivery_time,
    })
}

/// Whether an emergency order has blown its 30-minute SLA as of `now`.
///
/// Derived, never stored: non-emergency and finished orders are never overdue.
#[must_use]
pub fn is_overdue(order: &order::Model, now: DateTime<Utc>) -> bool {
    order.is_emergency
        && !order.status.is_terminal()
        && now - order.created_at > Duration::minutes(EMERGENCY_SLA_MINUTES)
}
