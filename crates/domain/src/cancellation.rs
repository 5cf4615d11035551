// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Late-cancellation fee.
//!
//! The fee is informational: it is disclosed to the caller and written
//! into the status history note, never charged automatically.

use crate::pricing::round_percent;
use time::{Duration, OffsetDateTime};

/// Share of the order total charged for a late cancellation.
pub const CANCELLATION_FEE_PERCENT: i64 = 25;

/// Cancellations closer than this to the service start incur the fee.
pub const CANCELLATION_FEE_WINDOW_HOURS: i64 = 12;

/// Computes the cancellation fee for an order starting at `service_start`.
///
/// The fee applies only when the service starts strictly within the next
/// [`CANCELLATION_FEE_WINDOW_HOURS`] hours. Services already started (or
/// in the past) and services further out carry no fee.
#[must_use]
pub fn compute_cancellation_fee(
    total_price: i64,
    service_start: OffsetDateTime,
    now: OffsetDateTime,
) -> i64 {
    let until_service: Duration = service_start - now;
    if until_service > Duration::ZERO
        && until_service < Duration::hours(CANCELLATION_FEE_WINDOW_HOURS)
    {
        round_percent(total_price, CANCELLATION_FEE_PERCENT)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const START: OffsetDateTime = datetime!(2026-03-10 09:00 +07:00);

    #[test]
    fn test_fee_inside_window() {
        let now = START - Duration::hours(5);
        assert_eq!(compute_cancellation_fee(195_000, START, now), 48_750);
    }

    #[test]
    fn test_no_fee_at_or_beyond_twelve_hours() {
        assert_eq!(
            compute_cancellation_fee(195_000, START, START - Duration::hours(12)),
            0
        );
        assert_eq!(
            compute_cancellation_fee(195_000, START, START - Duration::days(2)),
            0
        );
    }

    #[test]
    fn test_fee_just_inside_twelve_hours() {
        let now = START - Duration::hours(12) + Duration::seconds(1);
        assert_eq!(compute_cancellation_fee(100_000, START, now), 25_000);
    }

    #[test]
    fn test_no_fee_once_service_has_started() {
        assert_eq!(compute_cancellation_fee(195_000, START, START), 0);
        assert_eq!(
            compute_cancellation_fee(195_000, START, START + Duration::hours(1)),
            0
        );
    }
}
