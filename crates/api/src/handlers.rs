// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for order and payment operations.
//!
//! Handlers translate request DTOs into lifecycle commands, call the
//! lifecycle manager or payment reconciler, and shape the result into a
//! response DTO. They never touch HTTP types.

use clean_aceh::{
    CancelOrder, CancellationResult, ChangeStatus, CreateOrder, CreatePayment,
    GatewayNotification, ListOrders, ListPayments, OrderDetails, OrderLifecycle, OrderStats,
    Page, PaymentIntent, PaymentReconciler, PaymentRecord, TransitionResult, WebhookOutcome,
};
use clean_aceh_domain::{
    DEFAULT_PAGE_SIZE, Order, OrderStatus, PageRequest, PaymentStatus, Requester, TimeOfDay,
};
use time::{Date, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthenticatedActor;
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{
    CancelOrderRequest, CancelOrderResponse, ChargeDetailsResponse, CreateOrderRequest,
    CreatePaymentRequest, CreatePaymentResponse, ListOrdersQuery, ListPaymentsQuery, ListResponse,
    NotificationAckResponse, OrderDetailResponse, OrderResponse, OrderStatsResponse, PageMeta,
    PaymentNotificationRequest, PaymentRecordResponse, StatusHistoryResponse,
    UpdateOrderStatusRequest, UpdateOrderStatusResponse,
};

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]");

fn parse_id(field: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("'{raw}' is not a valid id"),
    })
}

fn parse_date(field: &str, raw: &str) -> Result<Date, ApiError> {
    Date::parse(raw.trim(), DATE_FORMAT).map_err(|_| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("'{raw}' is not a date in YYYY-MM-DD format"),
    })
}

fn parse_time(field: &str, raw: &str) -> Result<TimeOfDay, ApiError> {
    raw.trim()
        .parse::<TimeOfDay>()
        .map_err(|_| ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("'{raw}' is not a time in HH:MM format"),
        })
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|raw| !raw.is_empty())
}

fn parse_count(field: &str, raw: Option<&str>, default: u32) -> Result<u32, ApiError> {
    present(raw).map_or(Ok(default), |raw| {
        raw.parse().map_err(|_| ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("'{raw}' is not a whole number"),
        })
    })
}

fn parse_page(page: Option<&str>, limit: Option<&str>) -> Result<PageRequest, ApiError> {
    let page: u32 = parse_count("page", page, 1)?;
    let limit: u32 = parse_count("limit", limit, DEFAULT_PAGE_SIZE)?;
    PageRequest::new(page, limit).map_err(translate_domain_error)
}

/// Translates an order listing query string into a lifecycle query.
///
/// Absent values take their defaults: page 1, ten rows, every status,
/// newest first.
///
/// # Errors
///
/// Returns an error naming the first value that cannot be parsed or is
/// out of range.
pub fn parse_list_orders(query: &ListOrdersQuery) -> Result<ListOrders, ApiError> {
    let statuses: Vec<OrderStatus> = present(query.status.as_deref())
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
        .map_err(translate_domain_error)?
        .unwrap_or_default();

    Ok(ListOrders {
        statuses,
        sort: present(query.sort_by.as_deref())
            .map(str::parse)
            .transpose()
            .map_err(translate_domain_error)?
            .unwrap_or_default(),
        direction: present(query.sort_order.as_deref())
            .map(str::parse)
            .transpose()
            .map_err(translate_domain_error)?
            .unwrap_or_default(),
        page: parse_page(query.page.as_deref(), query.limit.as_deref())?,
    })
}

/// Translates a create-order request into a lifecycle command.
///
/// # Errors
///
/// Returns an error naming the first field that cannot be parsed.
pub fn parse_create_order(request: CreateOrderRequest) -> Result<CreateOrder, ApiError> {
    let cleaner_id: Uuid = parse_id("cleanerId", &request.cleaner_id)?;
    let service_id: Uuid = parse_id("serviceId", &request.service_id)?;
    let service_date: Date = parse_date("serviceDate", &request.service_date)?;
    let start_time: TimeOfDay = parse_time("startTime", &request.start_time)?;
    let end_time: Option<TimeOfDay> = request
        .end_time
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_time("endTime", raw))
        .transpose()?;
    let address_id: Option<Uuid> = request
        .address_id
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_id("addressId", raw))
        .transpose()?;

    Ok(CreateOrder {
        cleaner_id,
        service_id,
        address_id,
        service_address: request.service_address,
        service_date,
        start_time,
        end_time,
        base_price: request.base_price,
        add_ons_price: request.additional_services_price,
        platform_fee: request.platform_fee,
        tax_amount: request.tax_amount,
        total_price: request.total_price,
        additional_services: request.additional_services,
        special_instructions: request.special_instructions,
    })
}

/// Books a cleaner for the authenticated customer.
///
/// # Arguments
///
/// * `lifecycle` - The order lifecycle manager
/// * `actor` - The authenticated user; must be a customer
/// * `request` - The booking request
/// * `now` - The request time
///
/// # Errors
///
/// Returns an error if the request is malformed, the requester is not a
/// customer, a referenced record is missing, or a booking rule fails.
pub async fn create_order(
    lifecycle: &OrderLifecycle,
    actor: &AuthenticatedActor,
    request: CreateOrderRequest,
    now: OffsetDateTime,
) -> Result<OrderResponse, ApiError> {
    let command: CreateOrder = parse_create_order(request)?;
    let requester: Requester = actor.requester();

    let order: Order = lifecycle
        .create_order(&requester, command, now)
        .await
        .map_err(translate_core_error)?;

    info!(
        order_id = %order.id,
        order_number = %order.order_number,
        customer_id = %actor.user_id,
        "Order created via API"
    );
    Ok(OrderResponse::from(&order))
}

/// Moves an order to another status.
///
/// # Errors
///
/// Returns an error if the order id or status is malformed, the order
/// does not exist, the requester lacks authority, or the transition is
/// not allowed from the order's current status.
pub async fn update_order_status(
    lifecycle: &OrderLifecycle,
    actor: &AuthenticatedActor,
    order_id: &str,
    request: UpdateOrderStatusRequest,
    now: OffsetDateTime,
) -> Result<UpdateOrderStatusResponse, ApiError> {
    let order_id: Uuid = parse_id("orderId", order_id)?;
    let target: OrderStatus = request
        .status
        .trim()
        .parse()
        .map_err(translate_domain_error)?;

    let result: TransitionResult = lifecycle
        .update_order_status(
            &actor.requester(),
            ChangeStatus {
                order_id,
                target,
                note: request.notes,
            },
            now,
        )
        .await
        .map_err(translate_core_error)?;

    Ok(UpdateOrderStatusResponse {
        order: OrderResponse::from(&result.order),
        status_change: StatusHistoryResponse::from(&result.history),
    })
}

/// Cancels an order and discloses any late-cancellation fee.
///
/// # Errors
///
/// Returns an error if the order does not exist, the requester is not a
/// party to it, or it cannot be cancelled in its current status.
pub async fn cancel_order(
    lifecycle: &OrderLifecycle,
    actor: &AuthenticatedActor,
    order_id: &str,
    request: CancelOrderRequest,
    now: OffsetDateTime,
) -> Result<CancelOrderResponse, ApiError> {
    let order_id: Uuid = parse_id("orderId", order_id)?;

    let result: CancellationResult = lifecycle
        .cancel_order(
            &actor.requester(),
            CancelOrder {
                order_id,
                reason: request.reason,
            },
            now,
        )
        .await
        .map_err(translate_core_error)?;

    Ok(CancelOrderResponse::from(&result))
}

/// Returns an order with its history and payments.
///
/// # Errors
///
/// Returns an error if the order does not exist or the requester is not a
/// party to it.
pub async fn get_order(
    lifecycle: &OrderLifecycle,
    actor: &AuthenticatedActor,
    order_id: &str,
) -> Result<OrderDetailResponse, ApiError> {
    let order_id: Uuid = parse_id("orderId", order_id)?;

    let details: OrderDetails = lifecycle
        .get_order(&actor.requester(), order_id)
        .await
        .map_err(translate_core_error)?;

    Ok(OrderDetailResponse::from(&details))
}

/// Lists the orders visible to the requester.
///
/// Customers see the orders they booked, cleaners the orders assigned to
/// them and admins every order.
///
/// # Errors
///
/// Returns an error if the query string is malformed or a cleaner has no
/// profile.
pub async fn list_orders(
    lifecycle: &OrderLifecycle,
    actor: &AuthenticatedActor,
    query: &ListOrdersQuery,
) -> Result<ListResponse<OrderResponse>, ApiError> {
    let query: ListOrders = parse_list_orders(query)?;

    let found: Page<Order> = lifecycle
        .list_orders(&actor.requester(), &query)
        .await
        .map_err(translate_core_error)?;

    Ok(ListResponse {
        items: found.items.iter().map(OrderResponse::from).collect(),
        meta: PageMeta::new(query.page, found.total),
    })
}

/// Counts the requester's orders per status.
///
/// # Errors
///
/// Returns an error if a cleaner has no profile or the store fails.
pub async fn order_stats(
    lifecycle: &OrderLifecycle,
    actor: &AuthenticatedActor,
) -> Result<OrderStatsResponse, ApiError> {
    let stats: OrderStats = lifecycle
        .order_stats(&actor.requester())
        .await
        .map_err(translate_core_error)?;
    Ok(OrderStatsResponse::from(&stats))
}

/// Starts a payment for a confirmed order.
///
/// # Errors
///
/// Returns an error if an id is malformed, the order or payment method is
/// missing, the order is not confirmed or already has an active payment,
/// or the gateway fails.
pub async fn create_payment(
    reconciler: &PaymentReconciler,
    actor: &AuthenticatedActor,
    request: CreatePaymentRequest,
    now: OffsetDateTime,
) -> Result<CreatePaymentResponse, ApiError> {
    let order_id: Uuid = parse_id("orderId", &request.order_id)?;
    let payment_method_id: Uuid = parse_id("paymentMethodId", &request.payment_method_id)?;

    let intent: PaymentIntent = reconciler
        .create_payment(
            &actor.requester(),
            CreatePayment {
                order_id,
                payment_method_id,
            },
            now,
        )
        .await
        .map_err(translate_core_error)?;

    Ok(CreatePaymentResponse {
        payment_id: intent.payment.id,
        order_id: intent.payment.order_id,
        amount: intent.payment.amount,
        status: intent.payment.status,
        payment_reference: intent.payment.reference.clone(),
        midtrans_response: ChargeDetailsResponse::from(&intent.charge),
    })
}

/// Lists payments for orders the requester booked, newest first.
///
/// # Errors
///
/// Returns an error if the query string is malformed or the store fails.
pub async fn list_payments(
    reconciler: &PaymentReconciler,
    actor: &AuthenticatedActor,
    query: &ListPaymentsQuery,
) -> Result<ListResponse<PaymentRecordResponse>, ApiError> {
    let status: Option<PaymentStatus> = present(query.status.as_deref())
        .map(str::parse)
        .transpose()
        .map_err(translate_domain_error)?;
    let query = ListPayments {
        status,
        page: parse_page(query.page.as_deref(), query.limit.as_deref())?,
    };

    let found: Page<PaymentRecord> = reconciler
        .list_payments(&actor.requester(), &query)
        .await
        .map_err(translate_core_error)?;

    Ok(ListResponse {
        items: found.items.iter().map(PaymentRecordResponse::from).collect(),
        meta: PageMeta::new(query.page, found.total),
    })
}

/// Returns one payment of the requester.
///
/// # Errors
///
/// Returns an error if the id is malformed or the payment does not
/// exist or belongs to another customer.
pub async fn get_payment(
    reconciler: &PaymentReconciler,
    actor: &AuthenticatedActor,
    payment_id: &str,
) -> Result<PaymentRecordResponse, ApiError> {
    let payment_id: Uuid = parse_id("paymentId", payment_id)?;

    let record: PaymentRecord = reconciler
        .get_payment(&actor.requester(), payment_id)
        .await
        .map_err(translate_core_error)?;

    Ok(PaymentRecordResponse::from(&record))
}

/// Applies a payment gateway notification.
///
/// Redelivered and out-of-order notifications are acknowledged without
/// changing anything.
///
/// # Errors
///
/// Returns an error if the signature is invalid, no payment carries the
/// notification's reference, or the store fails.
pub async fn handle_payment_notification(
    reconciler: &PaymentReconciler,
    request: PaymentNotificationRequest,
    now: OffsetDateTime,
) -> Result<NotificationAckResponse, ApiError> {
    let notification: GatewayNotification = GatewayNotification::from(request);

    let outcome: WebhookOutcome = reconciler
        .reconcile_webhook(&notification, now)
        .await
        .map_err(|e| {
            warn!(
                reference = %notification.order_id,
                error = %e,
                "Payment notification not applied"
            );
            translate_core_error(e)
        })?;

    let message: &str = match outcome {
        WebhookOutcome::Applied { .. } => "Payment status updated",
        WebhookOutcome::Unchanged { .. } => "Payment status already up to date",
        WebhookOutcome::Ignored { .. } => "Notification acknowledged",
    };
    Ok(NotificationAckResponse {
        message: message.to_string(),
    })
}
