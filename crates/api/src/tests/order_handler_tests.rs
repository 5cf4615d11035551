// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::datetime;

use super::helpers::{
    CLEANER_ID, CLEANER_USER_ID, CUSTOMER_ID, NOW, SERVICE_DATE, create_test_admin,
    create_test_cleaner, create_test_context, create_test_customer, create_valid_order_request,
    status_request,
};
use crate::{
    ApiError, CancelOrderRequest, CreateOrderRequest, cancel_order, create_order, get_order,
    parse_create_order, update_order_status,
};
use clean_aceh_domain::OrderStatus;

// ============================================================================
// Request parsing
// ============================================================================

#[test]
fn test_parse_create_order_maps_fields() {
    let command = parse_create_order(create_valid_order_request()).unwrap();

    assert_eq!(command.cleaner_id, CLEANER_ID);
    assert_eq!(command.service_date, SERVICE_DATE);
    assert_eq!(command.start_time.to_string(), "09:00");
    assert_eq!(command.end_time.map(|t| t.to_string()).as_deref(), Some("11:00"));
    assert_eq!(command.add_ons_price, 30_000);
    assert_eq!(command.platform_fee, None);
    assert_eq!(command.address_id, None);
}

#[test]
fn test_parse_create_order_treats_blank_optionals_as_absent() {
    let request = CreateOrderRequest {
        end_time: Some(String::new()),
        address_id: Some(String::from("  ")),
        ..create_valid_order_request()
    };

    let command = parse_create_order(request).unwrap();

    assert_eq!(command.end_time, None);
    assert_eq!(command.address_id, None);
}

#[test]
fn test_parse_create_order_names_bad_field() {
    let cases = [
        (
            CreateOrderRequest {
                cleaner_id: String::from("not-a-uuid"),
                ..create_valid_order_request()
            },
            "cleanerId",
        ),
        (
            CreateOrderRequest {
                service_date: String::from("10/03/2026"),
                ..create_valid_order_request()
            },
            "serviceDate",
        ),
        (
            CreateOrderRequest {
                start_time: String::from("9am"),
                ..create_valid_order_request()
            },
            "startTime",
        ),
        (
            CreateOrderRequest {
                end_time: Some(String::from("25:00")),
                ..create_valid_order_request()
            },
            "endTime",
        ),
    ];

    for (request, expected_field) in cases {
        match parse_create_order(request) {
            Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected invalid {expected_field}, got {other:?}"),
        }
    }
}

// ============================================================================
// Create order
// ============================================================================

#[tokio::test]
async fn test_create_order_returns_pending_order() {
    let ctx = create_test_context();

    let response = create_order(
        &ctx.lifecycle,
        &create_test_customer(),
        create_valid_order_request(),
        NOW,
    )
    .await
    .unwrap();

    assert_eq!(response.status, OrderStatus::Pending);
    assert_eq!(response.customer_id, CUSTOMER_ID);
    assert_eq!(response.pricing.platform_fee, 10_000);
    assert_eq!(response.pricing.tax_amount, 19_800);
    assert_eq!(response.pricing.total_price, 209_800);
    assert!(response.order_number.starts_with("CA"));
    assert_eq!(ctx.store.order_count().unwrap(), 1);
}

#[tokio::test]
async fn test_create_order_rejects_wrong_total_as_rule_violation() {
    let ctx = create_test_context();
    let request = CreateOrderRequest {
        total_price: 250_000,
        ..create_valid_order_request()
    };

    let result = create_order(&ctx.lifecycle, &create_test_customer(), request, NOW).await;

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "price_total"
    ));
}

#[tokio::test]
async fn test_create_order_by_cleaner_is_forbidden() {
    let ctx = create_test_context();

    let result = create_order(
        &ctx.lifecycle,
        &create_test_cleaner(),
        create_valid_order_request(),
        NOW,
    )
    .await;

    assert!(matches!(result, Err(ApiError::Forbidden { .. })));
}

#[tokio::test]
async fn test_second_booking_on_same_day_conflicts() {
    let ctx = create_test_context();
    create_order(
        &ctx.lifecycle,
        &create_test_customer(),
        create_valid_order_request(),
        NOW,
    )
    .await
    .unwrap();

    let request = CreateOrderRequest {
        start_time: String::from("14:00"),
        end_time: Some(String::from("16:00")),
        ..create_valid_order_request()
    };
    let result = create_order(&ctx.lifecycle, &create_test_customer(), request, NOW).await;

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[tokio::test]
async fn test_create_order_for_unknown_cleaner_is_not_found() {
    let ctx = create_test_context();
    let request = CreateOrderRequest {
        cleaner_id: uuid::Uuid::from_u128(0xdead).to_string(),
        ..create_valid_order_request()
    };

    let result = create_order(&ctx.lifecycle, &create_test_customer(), request, NOW).await;

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

// ============================================================================
// Status changes
// ============================================================================

#[tokio::test]
async fn test_cleaner_confirms_order() {
    let ctx = create_test_context();
    let created = create_order(
        &ctx.lifecycle,
        &create_test_customer(),
        create_valid_order_request(),
        NOW,
    )
    .await
    .unwrap();

    let response = update_order_status(
        &ctx.lifecycle,
        &create_test_cleaner(),
        &created.id.to_string(),
        status_request("confirmed"),
        NOW,
    )
    .await
    .unwrap();

    assert_eq!(response.order.status, OrderStatus::Confirmed);
    assert!(response.order.confirmed_at.is_some());
    assert_eq!(response.status_change.old_status, Some(OrderStatus::Pending));
    assert_eq!(response.status_change.changed_by, Some(CLEANER_USER_ID));
    assert_eq!(response.status_change.actor_type, "cleaner");
}

#[tokio::test]
async fn test_skipping_a_status_is_rule_violation() {
    let ctx = create_test_context();
    let created = create_order(
        &ctx.lifecycle,
        &create_test_customer(),
        create_valid_order_request(),
        NOW,
    )
    .await
    .unwrap();

    let result = update_order_status(
        &ctx.lifecycle,
        &create_test_admin(),
        &created.id.to_string(),
        status_request("completed"),
        NOW,
    )
    .await;

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "status_transition"
    ));
}

#[tokio::test]
async fn test_unknown_status_is_invalid_input() {
    let ctx = create_test_context();

    let result = update_order_status(
        &ctx.lifecycle,
        &create_test_admin(),
        &uuid::Uuid::from_u128(1).to_string(),
        status_request("finished"),
        NOW,
    )
    .await;

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "status"
    ));
}

#[tokio::test]
async fn test_malformed_order_id_is_invalid_input() {
    let ctx = create_test_context();

    let result = get_order(&ctx.lifecycle, &create_test_admin(), "12345").await;

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "orderId"
    ));
}

// ============================================================================
// Cancellation and detail
// ============================================================================

#[tokio::test]
async fn test_late_cancellation_discloses_fee() {
    let ctx = create_test_context();
    let created = create_order(
        &ctx.lifecycle,
        &create_test_customer(),
        create_valid_order_request(),
        NOW,
    )
    .await
    .unwrap();

    let response = cancel_order(
        &ctx.lifecycle,
        &create_test_customer(),
        &created.id.to_string(),
        CancelOrderRequest {
            reason: Some(String::from("Plans changed")),
        },
        datetime!(2026-03-10 04:00 +07:00),
    )
    .await
    .unwrap();

    assert_eq!(response.order.status, OrderStatus::Cancelled);
    assert_eq!(response.cancellation_fee, 52_450);
    assert_eq!(response.cancellation_reason, "Plans changed");
}

#[tokio::test]
async fn test_cancelling_twice_is_rule_violation() {
    let ctx = create_test_context();
    let created = create_order(
        &ctx.lifecycle,
        &create_test_customer(),
        create_valid_order_request(),
        NOW,
    )
    .await
    .unwrap();
    let order_id = created.id.to_string();
    cancel_order(
        &ctx.lifecycle,
        &create_test_customer(),
        &order_id,
        CancelOrderRequest::default(),
        NOW,
    )
    .await
    .unwrap();

    let result = cancel_order(
        &ctx.lifecycle,
        &create_test_customer(),
        &order_id,
        CancelOrderRequest::default(),
        NOW,
    )
    .await;

    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
}

#[tokio::test]
async fn test_order_detail_includes_history() {
    let ctx = create_test_context();
    let created = create_order(
        &ctx.lifecycle,
        &create_test_customer(),
        create_valid_order_request(),
        NOW,
    )
    .await
    .unwrap();
    update_order_status(
        &ctx.lifecycle,
        &create_test_cleaner(),
        &created.id.to_string(),
        status_request("confirmed"),
        NOW,
    )
    .await
    .unwrap();

    let detail = get_order(&ctx.lifecycle, &create_test_customer(), &created.id.to_string())
        .await
        .unwrap();

    let statuses: Vec<OrderStatus> = detail
        .status_history
        .iter()
        .map(|entry| entry.new_status)
        .collect();
    assert_eq!(statuses, vec![OrderStatus::Pending, OrderStatus::Confirmed]);
    assert_eq!(detail.status_history[0].old_status, None);
    assert!(detail.payments.is_empty());
}

#[tokio::test]
async fn test_order_response_serializes_camel_case() {
    let ctx = create_test_context();
    let created = create_order(
        &ctx.lifecycle,
        &create_test_customer(),
        create_valid_order_request(),
        NOW,
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&created).unwrap();

    assert_eq!(json["status"], "pending");
    assert_eq!(json["serviceDate"], "2026-03-10");
    assert_eq!(json["startTime"], "09:00");
    assert_eq!(json["pricing"]["additionalServicesPrice"], 30_000);
    assert!(json["confirmedAt"].is_null());
}
