// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod config;
mod session;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Path, Query, State as AxumState,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use clean_aceh::memory::InMemoryStore;
use clean_aceh::{OrderLifecycle, PaymentGateway, PaymentReconciler};
use clean_aceh_api::{
    ApiError, CancelOrderRequest, CancelOrderResponse, CreateOrderRequest, CreatePaymentRequest,
    CreatePaymentResponse, ListOrdersQuery, ListPaymentsQuery, ListResponse,
    NotificationAckResponse, OrderDetailResponse, OrderResponse, OrderStatsResponse, PageMeta,
    PaymentNotificationRequest, PaymentRecordResponse, TokenVerifier, UpdateOrderStatusRequest,
    UpdateOrderStatusResponse, cancel_order, create_order, create_payment, get_order,
    get_payment, handle_payment_notification, list_orders, list_payments, order_stats,
    update_order_status,
};
use clean_aceh_gateway::MidtransGateway;
use clean_aceh_persistence::SupabaseStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{Args, ServerConfig, StoreConfig};
use crate::session::AuthenticatedUser;

/// Application state shared across handlers.
///
/// The lifecycle and reconciler are cheap to clone; they share their
/// stores and gateway through `Arc`s.
#[derive(Clone)]
struct AppState {
    /// Order creation, transitions and reads.
    lifecycle: OrderLifecycle,
    /// Payment creation and gateway notifications.
    reconciler: PaymentReconciler,
    /// Access token verification.
    verifier: Arc<TokenVerifier>,
}

/// Success envelope wrapped around every authenticated response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SuccessResponse<T> {
    /// Always `success`.
    status: String,
    /// Human-readable summary.
    message: String,
    /// The payload.
    data: T,
    /// Paging details of a listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<PageMeta>,
    /// When the response was produced (RFC 3339).
    timestamp: String,
}

impl<T> SuccessResponse<T> {
    fn new(message: &str, data: T) -> Json<Self> {
        Json(Self {
            status: String::from("success"),
            message: message.to_string(),
            data,
            meta: None,
            timestamp: timestamp(),
        })
    }
}

impl<T> SuccessResponse<Vec<T>> {
    /// Puts the rows of a listing in `data` and its paging in `meta`.
    fn page(message: &str, listing: ListResponse<T>) -> Json<Self> {
        Json(Self {
            status: String::from("success"),
            message: message.to_string(),
            data: listing.items,
            meta: Some(listing.meta),
            timestamp: timestamp(),
        })
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FieldError {
    /// The offending request field.
    field: String,
    /// What is wrong with it.
    message: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Always `error`.
    status: String,
    /// Error message.
    message: String,
    /// Field detail for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
    /// When the response was produced (RFC 3339).
    timestamp: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    message: String,
    version: String,
    timestamp: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    /// Field detail, for validation failures only.
    errors: Option<Vec<FieldError>>,
}

impl HttpError {
    const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            errors: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            status: String::from("error"),
            message: self.message,
            errors: self.errors,
            timestamp: timestamp(),
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let message: String = err.public_message();
        match &err {
            ApiError::AuthenticationFailed { .. } => Self::new(StatusCode::UNAUTHORIZED, message),
            ApiError::Forbidden { .. } => Self::new(StatusCode::FORBIDDEN, message),
            ApiError::DomainRuleViolation { .. } => Self::new(StatusCode::BAD_REQUEST, message),
            ApiError::InvalidInput { field, .. } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: String::from("Validation failed"),
                errors: Some(vec![FieldError {
                    field: field.clone(),
                    message,
                }]),
            },
            ApiError::ResourceNotFound { .. } => Self::new(StatusCode::NOT_FOUND, message),
            ApiError::Conflict { .. } => Self::new(StatusCode::CONFLICT, message),
            ApiError::PaymentGateway { .. } | ApiError::Internal { .. } => {
                error!(error = %err, "Request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: String::from("Validation failed"),
            errors: Some(vec![FieldError {
                field: String::from("body"),
                message: rejection.body_text(),
            }]),
        }
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: String::from("Validation failed"),
            errors: Some(vec![FieldError {
                field: String::from("query"),
                message: rejection.body_text(),
            }]),
        }
    }
}

/// Parses a body that may be left empty.
fn parse_optional_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, HttpError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| HttpError {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        message: String::from("Validation failed"),
        errors: Some(vec![FieldError {
            field: String::from("body"),
            message: e.to_string(),
        }]),
    })
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Handler for GET `/health` endpoint.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("OK"),
        message: String::from("CleanAceh Backend Server is running"),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: timestamp(),
    })
}

/// Handler for POST `/api/v1/orders` endpoint.
///
/// Books a cleaner for the calling customer.
async fn handle_create_order(
    AxumState(app_state): AxumState<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SuccessResponse<OrderResponse>>), HttpError> {
    let Json(req) = payload?;
    info!(
        user_id = %actor.user_id,
        cleaner_id = %req.cleaner_id,
        service_date = %req.service_date,
        "Handling create_order request"
    );

    let order: OrderResponse =
        create_order(&app_state.lifecycle, &actor, req, OffsetDateTime::now_utc()).await?;

    Ok((
        StatusCode::CREATED,
        SuccessResponse::new("Order created successfully", order),
    ))
}

/// Handler for GET `/api/v1/orders` endpoint.
///
/// Pages through the orders visible to the caller.
async fn handle_list_orders(
    AxumState(app_state): AxumState<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Json<SuccessResponse<Vec<OrderResponse>>>, HttpError> {
    let Query(query) = query?;
    info!(user_id = %actor.user_id, user_type = %actor.user_type, "Handling list_orders request");

    let listing = list_orders(&app_state.lifecycle, &actor, &query).await?;

    Ok(SuccessResponse::page("Orders retrieved successfully", listing))
}

/// Handler for GET `/api/v1/orders/stats` endpoint.
async fn handle_order_stats(
    AxumState(app_state): AxumState<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<SuccessResponse<OrderStatsResponse>>, HttpError> {
    let stats: OrderStatsResponse = order_stats(&app_state.lifecycle, &actor).await?;

    Ok(SuccessResponse::new(
        "Order statistics retrieved successfully",
        stats,
    ))
}

/// Handler for GET `/api/v1/orders/{order_id}` endpoint.
async fn handle_get_order(
    AxumState(app_state): AxumState<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(order_id): Path<String>,
) -> Result<Json<SuccessResponse<OrderDetailResponse>>, HttpError> {
    info!(user_id = %actor.user_id, order_id = %order_id, "Handling get_order request");

    let detail: OrderDetailResponse = get_order(&app_state.lifecycle, &actor, &order_id).await?;

    Ok(SuccessResponse::new("Order retrieved successfully", detail))
}

/// Handler for PUT `/api/v1/orders/{order_id}/status` endpoint.
async fn handle_update_order_status(
    AxumState(app_state): AxumState<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(order_id): Path<String>,
    payload: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<UpdateOrderStatusResponse>>, HttpError> {
    let Json(req) = payload?;
    info!(
        user_id = %actor.user_id,
        order_id = %order_id,
        target = %req.status,
        "Handling update_order_status request"
    );

    let response: UpdateOrderStatusResponse = update_order_status(
        &app_state.lifecycle,
        &actor,
        &order_id,
        req,
        OffsetDateTime::now_utc(),
    )
    .await?;

    Ok(SuccessResponse::new(
        "Order status updated successfully",
        response,
    ))
}

/// Handler for POST `/api/v1/orders/{order_id}/cancel` endpoint.
///
/// The body is optional; an empty one cancels with the default reason.
async fn handle_cancel_order(
    AxumState(app_state): AxumState<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(order_id): Path<String>,
    body: Bytes,
) -> Result<Json<SuccessResponse<CancelOrderResponse>>, HttpError> {
    let req: CancelOrderRequest = parse_optional_body(&body)?;
    info!(user_id = %actor.user_id, order_id = %order_id, "Handling cancel_order request");

    let response: CancelOrderResponse = cancel_order(
        &app_state.lifecycle,
        &actor,
        &order_id,
        req,
        OffsetDateTime::now_utc(),
    )
    .await?;

    Ok(SuccessResponse::new("Order cancelled successfully", response))
}

/// Handler for POST `/api/v1/payments/create` endpoint.
///
/// Charges the customer's payment method for a confirmed order.
async fn handle_create_payment(
    AxumState(app_state): AxumState<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SuccessResponse<CreatePaymentResponse>>), HttpError> {
    let Json(req) = payload?;
    info!(
        user_id = %actor.user_id,
        order_id = %req.order_id,
        "Handling create_payment request"
    );

    let response: CreatePaymentResponse = create_payment(
        &app_state.reconciler,
        &actor,
        req,
        OffsetDateTime::now_utc(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        SuccessResponse::new("Payment created successfully", response),
    ))
}

/// Handler for GET `/api/v1/payments/history` endpoint.
async fn handle_payment_history(
    AxumState(app_state): AxumState<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    query: Result<Query<ListPaymentsQuery>, QueryRejection>,
) -> Result<Json<SuccessResponse<Vec<PaymentRecordResponse>>>, HttpError> {
    let Query(query) = query?;
    info!(user_id = %actor.user_id, "Handling payment_history request");

    let listing = list_payments(&app_state.reconciler, &actor, &query).await?;

    Ok(SuccessResponse::page(
        "Payment history retrieved successfully",
        listing,
    ))
}

/// Handler for GET `/api/v1/payments/{payment_id}` endpoint.
///
/// Only the customer who booked the order can see its payments.
async fn handle_get_payment(
    AxumState(app_state): AxumState<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(payment_id): Path<String>,
) -> Result<Json<SuccessResponse<PaymentRecordResponse>>, HttpError> {
    info!(user_id = %actor.user_id, payment_id = %payment_id, "Handling get_payment request");

    let payment: PaymentRecordResponse =
        get_payment(&app_state.reconciler, &actor, &payment_id).await?;

    Ok(SuccessResponse::new("Payment retrieved successfully", payment))
}

fn webhook_reply(status: StatusCode, message: &str) -> (StatusCode, Json<NotificationAckResponse>) {
    (
        status,
        Json(NotificationAckResponse {
            message: message.to_string(),
        }),
    )
}

/// Handler for POST `/api/v1/payments/webhook` endpoint.
///
/// Called by the payment gateway, not by users. Always answers 200, 404
/// or 500 with a bare `{message}` body; failures are logged rather than
/// propagated. A notification that cannot be read or whose signature does
/// not verify names no payment we can act on and is answered 404.
async fn handle_payment_webhook(
    AxumState(app_state): AxumState<AppState>,
    payload: Result<Json<PaymentNotificationRequest>, JsonRejection>,
) -> (StatusCode, Json<NotificationAckResponse>) {
    let req: PaymentNotificationRequest = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Unreadable payment notification");
            return webhook_reply(StatusCode::NOT_FOUND, "Payment not found");
        }
    };
    info!(
        reference = %req.order_id,
        transaction_status = %req.transaction_status,
        "Handling payment notification"
    );

    match handle_payment_notification(&app_state.reconciler, req, OffsetDateTime::now_utc()).await
    {
        Ok(ack) => (StatusCode::OK, Json(ack)),
        Err(ApiError::ResourceNotFound { .. }) => {
            webhook_reply(StatusCode::NOT_FOUND, "Payment not found")
        }
        Err(ApiError::Forbidden { .. }) => {
            warn!("Payment notification signature did not verify");
            webhook_reply(StatusCode::NOT_FOUND, "Payment not found")
        }
        Err(err) => {
            error!(error = %err, "Payment notification processing failed");
            webhook_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Webhook processing failed",
            )
        }
    }
}

async fn handle_not_found(uri: Uri) -> HttpError {
    HttpError::new(StatusCode::NOT_FOUND, format!("Route {uri} not found"))
}

/// Builds the CORS layer for the configured frontend origin.
///
/// `*` allows any origin. An origin that is not a valid header value is
/// logged and leaves cross-origin requests disallowed.
fn cors_layer(frontend_url: &str) -> CorsLayer {
    let cors: CorsLayer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if frontend_url == "*" {
        return cors.allow_origin(Any);
    }

    match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
        Ok(origin) => {
            info!(origin = %frontend_url, "CORS configured");
            cors.allow_origin(AllowOrigin::list([origin]))
        }
        Err(_) => {
            error!(origin = %frontend_url, "Invalid CORS origin; expected a valid HeaderValue");
            cors
        }
    }
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/v1/orders",
            get(handle_list_orders).post(handle_create_order),
        )
        .route("/api/v1/orders/stats", get(handle_order_stats))
        .route("/api/v1/orders/{order_id}", get(handle_get_order))
        .route(
            "/api/v1/orders/{order_id}/status",
            put(handle_update_order_status),
        )
        .route("/api/v1/orders/{order_id}/cancel", post(handle_cancel_order))
        .route("/api/v1/payments/create", post(handle_create_payment))
        .route("/api/v1/payments/history", get(handle_payment_history))
        .route("/api/v1/payments/webhook", post(handle_payment_webhook))
        .route("/api/v1/payments/{payment_id}", get(handle_get_payment))
        .fallback(handle_not_found)
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Wires the lifecycle over the configured store.
fn build_lifecycle(config: &ServerConfig) -> OrderLifecycle {
    match &config.store {
        StoreConfig::Supabase {
            url,
            service_role_key,
        } => {
            info!(url = %url, "Using Supabase store");
            let store: Arc<SupabaseStore> =
                Arc::new(SupabaseStore::connect(url, service_role_key.clone()));
            OrderLifecycle::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store,
                config.policy.clone(),
            )
        }
        StoreConfig::InMemory => {
            warn!("SUPABASE_URL not set; orders are kept in memory and lost on restart");
            let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
            OrderLifecycle::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store,
                config.policy.clone(),
            )
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing CleanAceh Server");

    let config: ServerConfig = ServerConfig::from_args(args)?;

    let lifecycle: OrderLifecycle = build_lifecycle(&config);
    info!(
        production = config.midtrans.is_production,
        verify_signatures = config.midtrans.verify_signatures,
        "Using Midtrans gateway"
    );
    let gateway: Arc<dyn PaymentGateway> = Arc::new(MidtransGateway::new(config.midtrans.clone()));
    let reconciler: PaymentReconciler =
        PaymentReconciler::new(lifecycle.clone(), gateway, config.payment_callback_url());

    let app_state: AppState = AppState {
        lifecycle,
        reconciler,
        verifier: Arc::new(TokenVerifier::new(&config.jwt_secret)),
    };

    // Build router
    let app: Router = build_router(app_state, cors_layer(&config.frontend_url));

    // Bind to address
    let addr: std::net::SocketAddr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
