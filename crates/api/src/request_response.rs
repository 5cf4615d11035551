// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Field names are camelCase on the wire. Request fields that need
//! parsing (ids, dates, times, statuses) arrive as strings so that a bad
//! value is reported against its field rather than as an unreadable body.

use clean_aceh::{
    CancellationResult, ChargeResponse, GatewayNotification, OrderDetails, OrderStats,
    PaymentRecord,
};
use clean_aceh_audit::StatusHistoryEntry;
use clean_aceh_domain::{Order, OrderStatus, PageRequest, Payment, PaymentStatus, TimeOfDay};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// API request to book a cleaner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Cleaner profile id.
    pub cleaner_id: String,
    /// Service id.
    pub service_id: String,
    /// Service date (`YYYY-MM-DD`).
    pub service_date: String,
    /// Start time (`HH:MM`).
    pub start_time: String,
    /// End time (`HH:MM`), optional.
    #[serde(default)]
    pub end_time: Option<String>,
    /// A saved address of the customer.
    #[serde(default)]
    pub address_id: Option<String>,
    /// Address text.
    #[serde(default)]
    pub service_address: String,
    /// Service base price.
    pub base_price: i64,
    /// Names of the selected add-ons.
    #[serde(default)]
    pub additional_services: Vec<String>,
    /// Price of the selected add-ons.
    #[serde(default)]
    pub additional_services_price: i64,
    /// Platform fee; the configured default when absent.
    #[serde(default)]
    pub platform_fee: Option<i64>,
    /// Tax amount; computed when absent.
    #[serde(default)]
    pub tax_amount: Option<i64>,
    /// The total shown to the customer.
    pub total_price: i64,
    /// Notes for the cleaner.
    #[serde(default)]
    pub special_instructions: Option<String>,
}

/// API request to change an order's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    /// Requested status, e.g. `on_the_way`.
    pub status: String,
    /// Note recorded in the status history.
    #[serde(default)]
    pub notes: Option<String>,
}

/// API request to cancel an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    /// Why the order is being cancelled.
    #[serde(default)]
    pub reason: Option<String>,
}

/// API request to pay for a confirmed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// The order to pay for.
    pub order_id: String,
    /// A saved payment method of the customer.
    pub payment_method_id: String,
}

/// Query string of an order listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<String>,
    /// Rows per page.
    #[serde(default)]
    pub limit: Option<String>,
    /// One status or a comma-separated list.
    #[serde(default)]
    pub status: Option<String>,
    /// `created_at`, `service_date` or `total_price`.
    #[serde(default)]
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    #[serde(default)]
    pub sort_order: Option<String>,
}

/// Query string of the payment history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPaymentsQuery {
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<String>,
    /// Rows per page.
    #[serde(default)]
    pub limit: Option<String>,
    /// Payment status.
    #[serde(default)]
    pub status: Option<String>,
}

/// Payment gateway notification body. Field names follow the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentNotificationRequest {
    /// Our merchant reference.
    pub order_id: String,
    /// The gateway's transaction id.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Gateway transaction status.
    pub transaction_status: String,
    /// Fraud screening verdict.
    #[serde(default)]
    pub fraud_status: Option<String>,
    /// Gateway status code.
    #[serde(default)]
    pub status_code: Option<String>,
    /// Gross amount as formatted by the gateway.
    #[serde(default)]
    pub gross_amount: Option<String>,
    /// Notification signature.
    #[serde(default)]
    pub signature_key: Option<String>,
}

impl From<PaymentNotificationRequest> for GatewayNotification {
    fn from(request: PaymentNotificationRequest) -> Self {
        Self {
            order_id: request.order_id,
            transaction_id: request.transaction_id,
            transaction_status: request.transaction_status,
            fraud_status: request.fraud_status,
            status_code: request.status_code,
            gross_amount: request.gross_amount,
            signature_key: request.signature_key,
        }
    }
}

/// Price components of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResponse {
    /// Service base price.
    pub base_price: i64,
    /// Add-on total.
    pub additional_services_price: i64,
    /// Platform fee.
    pub platform_fee: i64,
    /// Tax.
    pub tax_amount: i64,
    /// Total charged.
    pub total_price: i64,
}

/// An order as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    /// Order id.
    pub id: Uuid,
    /// Human-readable order number.
    pub order_number: String,
    /// Current status.
    pub status: OrderStatus,
    /// Booking customer.
    pub customer_id: Uuid,
    /// Assigned cleaner profile.
    pub cleaner_id: Uuid,
    /// Booked service.
    pub service_id: Uuid,
    /// Service date.
    #[serde(with = "iso_date")]
    pub service_date: Date,
    /// Start time.
    pub start_time: TimeOfDay,
    /// End time.
    pub end_time: Option<TimeOfDay>,
    /// Saved address id.
    pub address_id: Option<Uuid>,
    /// Address text.
    pub service_address: String,
    /// Price components.
    pub pricing: PricingResponse,
    /// Add-on names.
    pub additional_services: Vec<String>,
    /// Notes for the cleaner.
    pub special_instructions: Option<String>,
    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Confirmation time.
    #[serde(with = "time::serde::rfc3339::option")]
    pub confirmed_at: Option<OffsetDateTime>,
    /// Start-of-work time.
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    /// Completion time.
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    /// Cancellation time.
    #[serde(with = "time::serde::rfc3339::option")]
    pub cancelled_at: Option<OffsetDateTime>,
    /// Last modification.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            status: order.status,
            customer_id: order.customer_id,
            cleaner_id: order.cleaner_id,
            service_id: order.service_id,
            service_date: order.service_date,
            start_time: order.start_time,
            end_time: order.end_time,
            address_id: order.address_id,
            service_address: order.service_address.clone(),
            pricing: PricingResponse {
                base_price: order.pricing.base_price,
                additional_services_price: order.pricing.add_ons_price,
                platform_fee: order.pricing.platform_fee,
                tax_amount: order.pricing.tax_amount,
                total_price: order.pricing.total_price,
            },
            additional_services: order.additional_services.clone(),
            special_instructions: order.special_instructions.clone(),
            created_at: order.timestamps.created_at,
            confirmed_at: order.timestamps.confirmed_at,
            started_at: order.timestamps.started_at,
            completed_at: order.timestamps.completed_at,
            cancelled_at: order.timestamps.cancelled_at,
            updated_at: order.updated_at,
        }
    }
}

/// One status history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryResponse {
    /// Entry id.
    pub id: Uuid,
    /// Status before the change; absent for the creation entry.
    pub old_status: Option<OrderStatus>,
    /// Status after the change.
    pub new_status: OrderStatus,
    /// The user who made the change; absent for system changes.
    pub changed_by: Option<Uuid>,
    /// `customer`, `cleaner`, `admin` or `system:<process>`.
    pub actor_type: String,
    /// Note.
    pub notes: Option<String>,
    /// When the change was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&StatusHistoryEntry> for StatusHistoryResponse {
    fn from(entry: &StatusHistoryEntry) -> Self {
        Self {
            id: entry.id,
            old_status: entry.old_status,
            new_status: entry.new_status,
            changed_by: entry.actor.user_id,
            actor_type: entry.actor.actor_type.clone(),
            notes: entry.note.clone(),
            created_at: entry.recorded_at,
        }
    }
}

/// A payment as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    /// Payment id.
    pub id: Uuid,
    /// The order paid for.
    pub order_id: Uuid,
    /// The saved method used.
    pub payment_method_id: Uuid,
    /// Amount.
    pub amount: i64,
    /// Current status.
    pub status: PaymentStatus,
    /// Merchant reference sent to the gateway.
    pub payment_reference: String,
    /// Gateway transaction id.
    pub transaction_id: Option<String>,
    /// When the payment was captured.
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            order_id: payment.order_id,
            payment_method_id: payment.payment_method_id,
            amount: payment.amount,
            status: payment.status,
            payment_reference: payment.reference.clone(),
            transaction_id: payment.transaction_id.clone(),
            paid_at: payment.paid_at,
            created_at: payment.created_at,
        }
    }
}

/// An order with its history and payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailResponse {
    /// The order.
    #[serde(flatten)]
    pub order: OrderResponse,
    /// Status history, oldest first.
    pub status_history: Vec<StatusHistoryResponse>,
    /// Payments, oldest first.
    pub payments: Vec<PaymentResponse>,
}

impl From<&OrderDetails> for OrderDetailResponse {
    fn from(details: &OrderDetails) -> Self {
        Self {
            order: OrderResponse::from(&details.order),
            status_history: details
                .history
                .iter()
                .map(StatusHistoryResponse::from)
                .collect(),
            payments: details.payments.iter().map(PaymentResponse::from).collect(),
        }
    }
}

/// API response for a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusResponse {
    /// The order after the change.
    #[serde(flatten)]
    pub order: OrderResponse,
    /// The history entry recorded for the change.
    pub status_change: StatusHistoryResponse,
}

/// API response for a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderResponse {
    /// The cancelled order.
    #[serde(flatten)]
    pub order: OrderResponse,
    /// Disclosed cancellation fee. Not charged automatically.
    pub cancellation_fee: i64,
    /// Recorded reason.
    pub cancellation_reason: String,
}

impl From<&CancellationResult> for CancelOrderResponse {
    fn from(result: &CancellationResult) -> Self {
        Self {
            order: OrderResponse::from(&result.order),
            cancellation_fee: result.cancellation_fee,
            cancellation_reason: result.reason.clone(),
        }
    }
}

/// What the customer needs to finish paying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeDetailsResponse {
    /// Gateway transaction id.
    pub transaction_id: String,
    /// Gateway transaction status.
    pub transaction_status: String,
    /// Channel used by the gateway.
    pub payment_type: String,
    /// Web checkout URL.
    pub redirect_url: Option<String>,
    /// App deeplink.
    pub deeplink: Option<String>,
    /// QR code image URL.
    pub qr_code_url: Option<String>,
}

impl From<&ChargeResponse> for ChargeDetailsResponse {
    fn from(charge: &ChargeResponse) -> Self {
        Self {
            transaction_id: charge.transaction_id.clone(),
            transaction_status: charge.transaction_status.clone(),
            payment_type: charge.payment_type.clone(),
            redirect_url: charge.redirect_url.clone(),
            deeplink: charge.deeplink_url.clone(),
            qr_code_url: charge.qr_code_url.clone(),
        }
    }
}

/// API response for a created payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    /// Payment id.
    pub payment_id: Uuid,
    /// The order paid for.
    pub order_id: Uuid,
    /// Amount charged.
    pub amount: i64,
    /// Payment status.
    pub status: PaymentStatus,
    /// Merchant reference.
    pub payment_reference: String,
    /// Gateway charge details.
    pub midtrans_response: ChargeDetailsResponse,
}

/// Acknowledgement of a gateway notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAckResponse {
    /// What happened.
    pub message: String,
}

/// Paging details sent alongside a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// 1-based page number.
    pub page: u32,
    /// Rows per page.
    pub limit: u32,
    /// Matching rows across all pages.
    pub total: u64,
    /// Number of pages.
    pub total_pages: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
}

impl PageMeta {
    /// Paging details of `page` within `total` rows.
    #[must_use]
    pub const fn new(page: PageRequest, total: u64) -> Self {
        Self {
            page: page.page(),
            limit: page.limit(),
            total,
            total_pages: page.total_pages(total),
            has_next: page.has_next(total),
            has_prev: page.page() > 1,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Paging details.
    pub meta: PageMeta,
}

/// Order counts per status for the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatsResponse {
    /// All visible orders.
    pub total: u64,
    /// Awaiting the cleaner.
    pub pending: u64,
    /// Accepted by the cleaner.
    pub confirmed: u64,
    /// Cleaner travelling.
    pub on_the_way: u64,
    /// Work under way.
    pub in_progress: u64,
    /// Finished.
    pub completed: u64,
    /// Cancelled.
    pub cancelled: u64,
    /// The latest orders, newest first.
    pub recent_orders: Vec<OrderResponse>,
}

impl From<&OrderStats> for OrderStatsResponse {
    fn from(stats: &OrderStats) -> Self {
        Self {
            total: stats.total,
            pending: stats.pending,
            confirmed: stats.confirmed,
            on_the_way: stats.on_the_way,
            in_progress: stats.in_progress,
            completed: stats.completed,
            cancelled: stats.cancelled,
            recent_orders: stats.recent_orders.iter().map(OrderResponse::from).collect(),
        }
    }
}

/// A payment with the number and date of the order it pays for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecordResponse {
    /// The payment.
    #[serde(flatten)]
    pub payment: PaymentResponse,
    /// Number of the order paid for.
    pub order_number: String,
    /// Service date of the order.
    #[serde(with = "iso_date")]
    pub service_date: Date,
}

impl From<&PaymentRecord> for PaymentRecordResponse {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            payment: PaymentResponse::from(&record.payment),
            order_number: record.order_number.clone(),
            service_date: record.service_date,
        }
    }
}
