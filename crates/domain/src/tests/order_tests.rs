// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    ADMIN_ID, CLEANER_USER_ID, CREATED_AT, CUSTOMER_ID, STRANGER_ID, create_test_order,
};
use crate::{
    DomainError, LifecycleStamp, OrderStatus, Requester, UserType, authorize_cancellation,
    authorize_status_change, generate_order_number,
};
use time::macros::{datetime, offset};
use time::{Duration, OffsetDateTime};

const NOW: OffsetDateTime = datetime!(2026-03-05 08:00 +07:00);

fn customer() -> Requester {
    Requester::new(CUSTOMER_ID, UserType::Customer)
}

fn cleaner() -> Requester {
    Requester::new(CLEANER_USER_ID, UserType::Cleaner)
}

fn admin() -> Requester {
    Requester::new(ADMIN_ID, UserType::Admin)
}

// ============================================================================
// Transitions
// ============================================================================

#[test]
fn test_every_allowed_transition_stamps_only_its_timestamp() {
    for from in OrderStatus::ALL {
        for &to in from.allowed_targets() {
            let order = create_test_order(from);
            let next = order.transitioned(to, NOW).unwrap();

            assert_eq!(next.status, to);
            assert_eq!(next.updated_at, NOW);
            for stamp in [
                LifecycleStamp::Confirmed,
                LifecycleStamp::Started,
                LifecycleStamp::Completed,
                LifecycleStamp::Cancelled,
            ] {
                let expected = (to.lifecycle_stamp() == Some(stamp)).then_some(NOW);
                assert_eq!(next.timestamps.get(stamp), expected, "{from} -> {to}");
            }
        }
    }
}

#[test]
fn test_disallowed_transition_leaves_order_unchanged() {
    for from in OrderStatus::ALL {
        for to in OrderStatus::ALL {
            if from.can_transition_to(to) {
                continue;
            }
            let order = create_test_order(from);
            let before = order.clone();
            assert_eq!(
                order.transitioned(to, NOW),
                Err(DomainError::InvalidStatusTransition { from, to })
            );
            assert_eq!(order, before);
        }
    }
}

#[test]
fn test_timestamps_never_run_backwards() {
    let confirmed = create_test_order(OrderStatus::Pending)
        .transitioned(OrderStatus::Confirmed, NOW)
        .unwrap();
    let skewed_clock = NOW - Duration::minutes(10);
    let cancelled = confirmed
        .transitioned(OrderStatus::Cancelled, skewed_clock)
        .unwrap();

    assert_eq!(cancelled.timestamps.confirmed_at, Some(NOW));
    assert_eq!(cancelled.timestamps.cancelled_at, Some(NOW));
    assert!(cancelled.timestamps.latest() >= CREATED_AT);
}

#[test]
fn test_full_lifecycle_sets_each_stamp_once() {
    let mut order = create_test_order(OrderStatus::Pending);
    let mut clock = NOW;
    for target in [
        OrderStatus::Confirmed,
        OrderStatus::OnTheWay,
        OrderStatus::InProgress,
        OrderStatus::Completed,
    ] {
        clock += Duration::hours(1);
        order = order.transitioned(target, clock).unwrap();
    }

    let stamps = order.timestamps;
    assert_eq!(stamps.confirmed_at, Some(NOW + Duration::hours(1)));
    assert_eq!(stamps.started_at, Some(NOW + Duration::hours(3)));
    assert_eq!(stamps.completed_at, Some(NOW + Duration::hours(4)));
    assert_eq!(stamps.cancelled_at, None);
    assert!(order.status.is_terminal());
}

// ============================================================================
// Status change authorization
// ============================================================================

#[test]
fn test_admin_and_assigned_cleaner_may_request_any_transition() {
    let order = create_test_order(OrderStatus::Confirmed);
    for target in OrderStatus::ALL {
        assert!(authorize_status_change(&admin(), &order, CLEANER_USER_ID, target).is_ok());
        assert!(authorize_status_change(&cleaner(), &order, CLEANER_USER_ID, target).is_ok());
    }
}

#[test]
fn test_other_cleaner_is_forbidden() {
    let order = create_test_order(OrderStatus::Confirmed);
    let other = Requester::new(STRANGER_ID, UserType::Cleaner);
    assert!(matches!(
        authorize_status_change(&other, &order, CLEANER_USER_ID, OrderStatus::OnTheWay),
        Err(DomainError::Forbidden { .. })
    ));
}

#[test]
fn test_customer_may_only_cancel_early() {
    for status in [OrderStatus::Pending, OrderStatus::Confirmed] {
        let order = create_test_order(status);
        assert!(
            authorize_status_change(&customer(), &order, CLEANER_USER_ID, OrderStatus::Cancelled)
                .is_ok()
        );
    }

    let order = create_test_order(OrderStatus::Pending);
    assert!(matches!(
        authorize_status_change(&customer(), &order, CLEANER_USER_ID, OrderStatus::Confirmed),
        Err(DomainError::Forbidden { .. })
    ));
}

#[test]
fn test_customer_cannot_cancel_order_on_the_way() {
    let order = create_test_order(OrderStatus::OnTheWay);
    assert!(matches!(
        authorize_status_change(&customer(), &order, CLEANER_USER_ID, OrderStatus::Cancelled),
        Err(DomainError::Forbidden { .. })
    ));
}

#[test]
fn test_customer_cannot_touch_another_customers_order() {
    let order = create_test_order(OrderStatus::Pending);
    let other = Requester::new(STRANGER_ID, UserType::Customer);
    assert!(
        authorize_status_change(&other, &order, CLEANER_USER_ID, OrderStatus::Cancelled).is_err()
    );
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_cancellation_states_per_role() {
    let cases = [
        (customer(), OrderStatus::Pending, true),
        (customer(), OrderStatus::Confirmed, true),
        (customer(), OrderStatus::OnTheWay, false),
        (cleaner(), OrderStatus::OnTheWay, true),
        (cleaner(), OrderStatus::InProgress, false),
        (admin(), OrderStatus::OnTheWay, true),
        (admin(), OrderStatus::InProgress, false),
        (admin(), OrderStatus::Completed, false),
    ];
    for (requester, status, allowed) in cases {
        let order = create_test_order(status);
        let result = authorize_cancellation(&requester, &order, CLEANER_USER_ID);
        if allowed {
            assert!(result.is_ok(), "{} on {status}", requester.user_type);
        } else {
            assert!(
                matches!(result, Err(DomainError::NotCancellable { .. })),
                "{} on {status}",
                requester.user_type
            );
        }
    }
}

#[test]
fn test_already_cancelled_order_is_not_cancellable() {
    let order = create_test_order(OrderStatus::Cancelled);
    assert!(matches!(
        authorize_cancellation(&admin(), &order, CLEANER_USER_ID),
        Err(DomainError::NotCancellable { .. })
    ));
}

#[test]
fn test_stranger_cannot_cancel() {
    let order = create_test_order(OrderStatus::Pending);
    let stranger = Requester::new(STRANGER_ID, UserType::Customer);
    assert!(matches!(
        authorize_cancellation(&stranger, &order, CLEANER_USER_ID),
        Err(DomainError::Forbidden { .. })
    ));
}

#[test]
fn test_order_cancellation_fee_uses_service_offset() {
    let order = create_test_order(OrderStatus::Confirmed);
    // Service starts 2026-03-10 09:00 +07:00, five hours later.
    let now = datetime!(2026-03-10 04:00 +07:00);
    assert_eq!(order.cancellation_fee(now, offset!(+7)), 48_750);
    assert_eq!(
        order.cancellation_fee(datetime!(2026-03-09 04:00 +07:00), offset!(+7)),
        0
    );
}

// ============================================================================
// Order numbers
// ============================================================================

#[test]
fn test_order_number_shape() {
    let now = datetime!(2026-03-05 08:00:01.234 UTC);
    let number = generate_order_number(now, 7);
    assert_eq!(number.len(), 11);
    assert!(number.starts_with("CA"));
    assert!(number.ends_with("007"));
    assert!(number[2..].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(&number[2..8], "601234");
}
