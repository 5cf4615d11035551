// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the order and payment lifecycle.
//!
//! This crate sits between the HTTP server and the lifecycle core. It
//! authenticates bearer tokens, parses request DTOs into commands,
//! translates core errors into the API error contract, and shapes
//! responses. It has no knowledge of HTTP itself.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, TokenClaims, TokenVerifier};
pub use error::{ApiError, AuthError, translate_core_error, translate_domain_error};
pub use handlers::{
    cancel_order, create_order, create_payment, get_order, get_payment,
    handle_payment_notification, list_orders, list_payments, order_stats, parse_create_order,
    parse_list_orders, update_order_status,
};
pub use request_response::{
    CancelOrderRequest, CancelOrderResponse, ChargeDetailsResponse, CreateOrderRequest,
    CreatePaymentRequest, CreatePaymentResponse, ListOrdersQuery, ListPaymentsQuery, ListResponse,
    NotificationAckResponse, OrderDetailResponse, OrderResponse, OrderStatsResponse, PageMeta,
    PaymentNotificationRequest, PaymentRecordResponse, PaymentResponse, PricingResponse,
    StatusHistoryResponse, UpdateOrderStatusRequest, UpdateOrderStatusResponse,
};
