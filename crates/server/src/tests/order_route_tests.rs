// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use clean_aceh::NotificationKind;
use clean_aceh_domain::UserType;
use serde_json::json;

use super::helpers::{
    CLEANER_USER_ID, CUSTOMER_ID, OTHER_CUSTOMER_ID, create_order_body, create_test_server,
    get_request, json_request,
};

// ============================================================================
// Health and routing
// ============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let server = create_test_server();

    let (status, body) = server.send(get_request("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let server = create_test_server();

    let (status, body) = server.send(get_request("/api/v1/nothing", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Route /api/v1/nothing not found");
    assert!(body["timestamp"].is_string());
}

// ============================================================================
// Create order
// ============================================================================

#[tokio::test]
async fn test_create_order_returns_created_envelope() {
    let server = create_test_server();

    let (status, body) = server
        .send(json_request(
            "POST",
            "/api/v1/orders",
            Some(&server.customer_token()),
            &create_order_body(),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Order created successfully");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["customerId"], CUSTOMER_ID.to_string());
    assert_eq!(body["data"]["pricing"]["totalPrice"], 209_800);
    assert_eq!(server.store.order_count().unwrap(), 1);
}

#[tokio::test]
async fn test_create_order_notifies_cleaner() {
    let server = create_test_server();

    server.create_order().await;

    let notifications = server.store.notifications().unwrap();
    assert!(
        notifications
            .iter()
            .any(|n| n.user_id == CLEANER_USER_ID && n.kind == NotificationKind::Order)
    );
}

#[tokio::test]
async fn test_create_order_with_wrong_total_is_bad_request() {
    let server = create_test_server();
    let mut body = create_order_body();
    body["totalPrice"] = json!(250_000);

    let (status, response) = server
        .send(json_request(
            "POST",
            "/api/v1/orders",
            Some(&server.customer_token()),
            &body,
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["status"], "error");
    assert_eq!(server.store.order_count().unwrap(), 0);
}

#[tokio::test]
async fn test_create_order_validation_error_names_field() {
    let server = create_test_server();
    let mut body = create_order_body();
    body["startTime"] = json!("9 o'clock");

    let (status, response) = server
        .send(json_request(
            "POST",
            "/api/v1/orders",
            Some(&server.customer_token()),
            &body,
        ))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["message"], "Validation failed");
    assert_eq!(response["errors"][0]["field"], "startTime");
}

#[tokio::test]
async fn test_create_order_with_malformed_body_is_unprocessable() {
    let server = create_test_server();

    let (status, response) = server
        .send(json_request(
            "POST",
            "/api/v1/orders",
            Some(&server.customer_token()),
            &json!({ "cleanerId": "abc" }),
        ))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["errors"][0]["field"], "body");
}

#[tokio::test]
async fn test_double_booking_is_conflict() {
    let server = create_test_server();
    server.create_order().await;

    let mut body = create_order_body();
    body["startTime"] = json!("13:00");
    body["endTime"] = json!("15:00");
    let (status, _) = server
        .send(json_request(
            "POST",
            "/api/v1/orders",
            Some(&server.customer_token()),
            &body,
        ))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(server.store.order_count().unwrap(), 1);
}

#[tokio::test]
async fn test_cleaner_cannot_create_order() {
    let server = create_test_server();

    let (status, _) = server
        .send(json_request(
            "POST",
            "/api/v1/orders",
            Some(&server.cleaner_token()),
            &create_order_body(),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Status changes and detail
// ============================================================================

#[tokio::test]
async fn test_full_lifecycle_through_http() {
    let server = create_test_server();
    let order_id = server.create_confirmed_order().await;

    for target in ["on_the_way", "in_progress", "completed"] {
        let (status, body) = server
            .send(json_request(
                "PUT",
                &format!("/api/v1/orders/{order_id}/status"),
                Some(&server.cleaner_token()),
                &json!({ "status": target, "notes": "on schedule" }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], target);
        assert_eq!(body["data"]["statusChange"]["newStatus"], target);
    }

    let (status, body) = server
        .send(get_request(
            &format!("/api/v1/orders/{order_id}"),
            Some(&server.customer_token()),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statusHistory"].as_array().unwrap().len(), 5);
    assert!(body["data"]["completedAt"].is_string());
}

#[tokio::test]
async fn test_illegal_transition_is_bad_request() {
    let server = create_test_server();
    let order_id = server.create_order().await;

    let (status, body) = server
        .send(json_request(
            "PUT",
            &format!("/api/v1/orders/{order_id}/status"),
            Some(&server.admin_token()),
            &json!({ "status": "completed" }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_customer_cannot_advance_order() {
    let server = create_test_server();
    let order_id = server.create_order().await;

    let (status, _) = server
        .send(json_request(
            "PUT",
            &format!("/api/v1/orders/{order_id}/status"),
            Some(&server.customer_token()),
            &json!({ "status": "confirmed" }),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_order_detail_hidden_from_other_customer() {
    let server = create_test_server();
    let order_id = server.create_order().await;

    let (status, _) = server
        .send(get_request(
            &format!("/api/v1/orders/{order_id}"),
            Some(&server.token_for(OTHER_CUSTOMER_ID, UserType::Customer)),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let server = create_test_server();

    let (status, _) = server
        .send(get_request(
            &format!("/api/v1/orders/{}", uuid::Uuid::from_u128(0xdead)),
            Some(&server.admin_token()),
        ))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_without_body_uses_default_reason() {
    let server = create_test_server();
    let order_id = server.create_order().await;

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v1/orders/{order_id}/cancel"))
        .header(
            "authorization",
            format!("Bearer {}", server.customer_token()),
        )
        .body(Body::empty())
        .unwrap();
    let (status, body) = server.send(request).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Order cancelled successfully");
    assert_eq!(body["data"]["status"], "cancelled");
    assert_eq!(body["data"]["cancellationFee"], 0);
    assert!(body["data"]["cancellationReason"].is_string());
}

#[tokio::test]
async fn test_cancel_records_reason() {
    let server = create_test_server();
    let order_id = server.create_order().await;

    let (status, body) = server
        .send(json_request(
            "POST",
            &format!("/api/v1/orders/{order_id}/cancel"),
            Some(&server.customer_token()),
            &json!({ "reason": "Travelling that week" }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cancellationReason"], "Travelling that week");
}

#[tokio::test]
async fn test_cancelled_order_cannot_be_cancelled_again() {
    let server = create_test_server();
    let order_id = server.create_order().await;
    let uri = format!("/api/v1/orders/{order_id}/cancel");
    server
        .send(json_request(
            "POST",
            &uri,
            Some(&server.customer_token()),
            &json!({}),
        ))
        .await;

    let (status, _) = server
        .send(json_request(
            "POST",
            &uri,
            Some(&server.customer_token()),
            &json!({}),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
