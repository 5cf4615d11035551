// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cleaner availability matching.
//!
//! A cleaner is bookable on a date when their weekly schedule has an
//! available window for that weekday, the requested start falls inside
//! the window (end-inclusive), and they hold no active order on that date.
//! The order conflict is a whole-day conflict: any active order on the
//! same date blocks the booking regardless of its time window.

use crate::error::DomainError;
use crate::order::Order;
use crate::time_of_day::TimeOfDay;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

/// Day of the week, numbered 0 (Sunday) through 6 (Saturday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    /// Creates a day from its number.
    ///
    /// # Errors
    ///
    /// Returns an error if `number` is greater than 6.
    pub fn new(number: u8) -> Result<Self, DomainError> {
        if number > 6 {
            return Err(DomainError::InvalidInput {
                field: "day_of_week",
                message: format!("{number} is not between 0 and 6"),
            });
        }
        Ok(Self(number))
    }

    /// The weekday of a calendar date.
    #[must_use]
    pub fn of(date: Date) -> Self {
        Self(date.weekday().number_days_from_sunday())
    }

    /// The day number (0 = Sunday).
    #[must_use]
    pub const fn number(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [&str; 7] = [
            "Sunday",
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
        ];
        f.write_str(NAMES[usize::from(self.0)])
    }
}

/// One recurring weekly availability window.
///
/// At most one entry exists per (cleaner, day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyScheduleEntry {
    /// The cleaner profile.
    pub cleaner_id: Uuid,
    /// Weekday this window applies to.
    pub day_of_week: DayOfWeek,
    /// Earliest bookable start.
    pub start_time: TimeOfDay,
    /// Latest bookable start.
    pub end_time: TimeOfDay,
    /// Whether the cleaner works on this day.
    pub is_available: bool,
}

/// Why a cleaner cannot take a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingRejection {
    /// No available schedule window for the weekday.
    NoSchedule {
        /// The requested weekday.
        day: DayOfWeek,
    },
    /// The requested start is outside the day's window.
    OutsideWindow {
        /// The requested start.
        requested: TimeOfDay,
        /// Window start.
        window_start: TimeOfDay,
        /// Window end.
        window_end: TimeOfDay,
    },
    /// The cleaner already has an active order that day.
    DoubleBooked {
        /// The order holding the day.
        conflicting_order_id: Uuid,
        /// The contested date.
        date: Date,
    },
}

impl std::fmt::Display for BookingRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSchedule { day } => write!(f, "cleaner does not work on {day}"),
            Self::OutsideWindow {
                requested,
                window_start,
                window_end,
            } => write!(
                f,
                "requested start {requested} is outside the cleaner's hours \
                 {window_start}-{window_end}"
            ),
            Self::DoubleBooked {
                conflicting_order_id,
                date,
            } => write!(
                f,
                "cleaner already has order {conflicting_order_id} on {date}"
            ),
        }
    }
}

/// Decides whether a cleaner can take a booking.
///
/// `schedule` is the cleaner's entry for the weekday of `date` (if any);
/// `existing_orders` may contain any of the cleaner's orders, only active
/// ones on `date` are considered conflicts. The check is pure.
///
/// # Errors
///
/// Returns the first applicable `BookingRejection`, checked in the order:
/// schedule, window, conflict.
pub fn check_bookable(
    cleaner_id: Uuid,
    date: Date,
    start_time: TimeOfDay,
    schedule: Option<&WeeklyScheduleEntry>,
    existing_orders: &[Order],
) -> Result<(), BookingRejection> {
    let day = DayOfWeek::of(date);
    let window = schedule
        .filter(|s| s.is_available && s.cleaner_id == cleaner_id && s.day_of_week == day)
        .ok_or(BookingRejection::NoSchedule { day })?;

    if start_time < window.start_time || start_time > window.end_time {
        return Err(BookingRejection::OutsideWindow {
            requested: start_time,
            window_start: window.start_time,
            window_end: window.end_time,
        });
    }

    if let Some(conflict) = existing_orders
        .iter()
        .find(|o| o.cleaner_id == cleaner_id && o.service_date == date && o.status.is_active())
    {
        return Err(BookingRejection::DoubleBooked {
            conflicting_order_id: conflict.id,
            date,
        });
    }

    Ok(())
}
