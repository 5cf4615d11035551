// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Orders and the rules for changing their status.

use crate::cancellation::compute_cancellation_fee;
use crate::error::DomainError;
use crate::order_status::{LifecycleStamp, OrderStatus};
use crate::time_of_day::TimeOfDay;
use crate::types::{Requester, UserType};
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use uuid::Uuid;

/// Price components stored on an order, in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// Service base price.
    pub base_price: i64,
    /// Sum of the selected add-on services.
    pub add_ons_price: i64,
    /// Platform fee.
    pub platform_fee: i64,
    /// Tax amount.
    pub tax_amount: i64,
    /// Total charged to the customer.
    pub total_price: i64,
}

/// When an order reached each lifecycle milestone.
///
/// A milestone timestamp is set exactly when the order reaches the
/// matching status and never changes afterwards. Timestamps never run
/// backwards: a stamp is never earlier than any stamp set before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTimestamps {
    /// Creation time.
    pub created_at: OffsetDateTime,
    /// Set on `confirmed`.
    pub confirmed_at: Option<OffsetDateTime>,
    /// Set on `in_progress`.
    pub started_at: Option<OffsetDateTime>,
    /// Set on `completed`.
    pub completed_at: Option<OffsetDateTime>,
    /// Set on `cancelled`.
    pub cancelled_at: Option<OffsetDateTime>,
}

impl LifecycleTimestamps {
    /// Timestamps for a freshly created order.
    #[must_use]
    pub const fn created(at: OffsetDateTime) -> Self {
        Self {
            created_at: at,
            confirmed_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
        }
    }

    /// The most recent timestamp set.
    #[must_use]
    pub fn latest(&self) -> OffsetDateTime {
        [
            self.confirmed_at,
            self.started_at,
            self.completed_at,
            self.cancelled_at,
        ]
        .into_iter()
        .flatten()
        .fold(self.created_at, OffsetDateTime::max)
    }

    /// Returns the value of one milestone.
    #[must_use]
    pub const fn get(&self, stamp: LifecycleStamp) -> Option<OffsetDateTime> {
        match stamp {
            LifecycleStamp::Confirmed => self.confirmed_at,
            LifecycleStamp::Started => self.started_at,
            LifecycleStamp::Completed => self.completed_at,
            LifecycleStamp::Cancelled => self.cancelled_at,
        }
    }

    fn set(&mut self, stamp: LifecycleStamp, at: OffsetDateTime) {
        let slot = match stamp {
            LifecycleStamp::Confirmed => &mut self.confirmed_at,
            LifecycleStamp::Started => &mut self.started_at,
            LifecycleStamp::Completed => &mut self.completed_at,
            LifecycleStamp::Cancelled => &mut self.cancelled_at,
        };
        *slot = Some(at);
    }
}

/// A booked cleaning job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Internal id.
    pub id: Uuid,
    /// Human-readable order number.
    pub order_number: String,
    /// Booking customer.
    pub customer_id: Uuid,
    /// Assigned cleaner profile.
    pub cleaner_id: Uuid,
    /// Booked service.
    pub service_id: Uuid,
    /// Saved address, when one was selected.
    pub address_id: Option<Uuid>,
    /// Free-text service address.
    pub service_address: String,
    /// Current status.
    pub status: OrderStatus,
    /// Service date.
    pub service_date: Date,
    /// Requested start.
    pub start_time: TimeOfDay,
    /// Requested end, if given.
    pub end_time: Option<TimeOfDay>,
    /// Price components.
    pub pricing: PriceBreakdown,
    /// Names of the add-on services.
    pub additional_services: Vec<String>,
    /// Notes for the cleaner.
    pub special_instructions: Option<String>,
    /// Lifecycle milestones.
    pub timestamps: LifecycleTimestamps,
    /// Last modification time.
    pub updated_at: OffsetDateTime,
}

impl Order {
    /// Returns this order moved to `target`, with the matching milestone stamped.
    ///
    /// The stamp is `now`, or the latest existing stamp if the clock reads
    /// earlier than that.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the transition table
    /// does not allow the change. `self` is never modified.
    pub fn transitioned(
        &self,
        target: OrderStatus,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        self.status.validate_transition(target)?;

        let at = now.max(self.timestamps.latest()).max(self.updated_at);
        let mut next = self.clone();
        next.status = target;
        if let Some(stamp) = target.lifecycle_stamp() {
            next.timestamps.set(stamp, at);
        }
        next.updated_at = at;
        Ok(next)
    }

    /// The moment the service starts, interpreting date and time in `offset`.
    #[must_use]
    pub fn service_start(&self, offset: UtcOffset) -> OffsetDateTime {
        PrimitiveDateTime::new(self.service_date, self.start_time.to_time()).assume_offset(offset)
    }

    /// The cancellation fee if the order were cancelled at `now`.
    #[must_use]
    pub fn cancellation_fee(&self, now: OffsetDateTime, offset: UtcOffset) -> i64 {
        compute_cancellation_fee(self.pricing.total_price, self.service_start(offset), now)
    }
}

/// Checks whether `requester` may move `order` to `target`.
///
/// - Admins may request any transition.
/// - The assigned cleaner may request any transition.
/// - The owning customer may only cancel, and only from `pending` or
///   `confirmed`.
///
/// Transition legality itself is checked separately by
/// [`OrderStatus::validate_transition`].
///
/// # Errors
///
/// Returns `DomainError::Forbidden` if the requester lacks authority.
pub fn authorize_status_change(
    requester: &Requester,
    order: &Order,
    cleaner_user_id: Uuid,
    target: OrderStatus,
) -> Result<(), DomainError> {
    let allowed = match requester.user_type {
        UserType::Admin => true,
        UserType::Cleaner => cleaner_user_id == requester.user_id,
        UserType::Customer => {
            order.customer_id == requester.user_id
                && target == OrderStatus::Cancelled
                && matches!(order.status, OrderStatus::Pending | OrderStatus::Confirmed)
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(DomainError::Forbidden {
            action: "update_order_status",
            reason: format!(
                "{} may not change this order from {} to {target}",
                requester.user_type, order.status
            ),
        })
    }
}

/// Checks whether `requester` may cancel `order` in its current status.
///
/// Customers may cancel their own `pending`/`confirmed` orders; the
/// assigned cleaner additionally while `on_the_way`; admins whenever the
/// transition table allows it.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` if the requester is not a party to the
/// order and `DomainError::NotCancellable` if the order's status does not
/// allow this requester to cancel.
pub fn authorize_cancellation(
    requester: &Requester,
    order: &Order,
    cleaner_user_id: Uuid,
) -> Result<(), DomainError> {
    let is_party = match requester.user_type {
        UserType::Admin => true,
        UserType::Cleaner => cleaner_user_id == requester.user_id,
        UserType::Customer => order.customer_id == requester.user_id,
    };
    if !is_party {
        return Err(DomainError::Forbidden {
            action: "cancel_order",
            reason: String::from("not a party to this order"),
        });
    }

    if order.status == OrderStatus::Cancelled {
        return Err(DomainError::NotCancellable {
            status: order.status,
            reason: String::from("order is already cancelled"),
        });
    }

    let cancellable = match requester.user_type {
        UserType::Admin => order.status.can_transition_to(OrderStatus::Cancelled),
        UserType::Cleaner => matches!(
            order.status,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::OnTheWay
        ),
        UserType::Customer => {
            matches!(order.status, OrderStatus::Pending | OrderStatus::Confirmed)
        }
    };

    if cancellable {
        Ok(())
    } else {
        Err(DomainError::NotCancellable {
            status: order.status,
            reason: format!(
                "{} may not cancel an order that is {}",
                requester.user_type, order.status
            ),
        })
    }
}

/// Builds an order number: `CA`, the last six digits of the epoch
/// milliseconds, then three random digits.
#[must_use]
pub fn generate_order_number(now: OffsetDateTime, random: u16) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    format!("CA{:06}{:03}", millis.rem_euclid(1_000_000), random % 1000)
}
