// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use clean_aceh::memory::InMemoryStore;
use clean_aceh::{
    ChargeRequest, ChargeResponse, GatewayError, GatewayNotification, LifecyclePolicy,
    OrderLifecycle, PaymentGateway, PaymentReconciler,
};
use clean_aceh_api::{AuthenticatedActor, TokenVerifier};
use clean_aceh_domain::{
    CleanerProfile, CustomerContact, DayOfWeek, PaymentMethod, PaymentMethodType,
    ServiceOffering, UserType, WeeklyScheduleEntry,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use time::macros::{format_description, offset};
use time::{Date, Duration, OffsetDateTime};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{AppState, build_router, cors_layer};

pub const JWT_SECRET: &str = "clean-aceh-test-secret-0123456789abcdef";

pub const CUSTOMER_ID: Uuid = Uuid::from_u128(0x0100);
pub const OTHER_CUSTOMER_ID: Uuid = Uuid::from_u128(0x0101);
pub const CLEANER_ID: Uuid = Uuid::from_u128(0x0200);
pub const CLEANER_USER_ID: Uuid = Uuid::from_u128(0x0201);
pub const ADMIN_ID: Uuid = Uuid::from_u128(0x0300);
pub const SERVICE_ID: Uuid = Uuid::from_u128(0x0500);
pub const METHOD_ID: Uuid = Uuid::from_u128(0x0700);

/// Accepts every charge unless told to fail.
#[derive(Debug, Default)]
pub struct StubGateway {
    pub fail_charges: AtomicBool,
    pub reject_signatures: AtomicBool,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, GatewayError> {
        if self.fail_charges.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport(String::from("connection reset")));
        }
        Ok(ChargeResponse {
            transaction_id: format!("txn-{}", request.reference),
            transaction_status: String::from("pending"),
            payment_type: request.channel.as_str().to_string(),
            redirect_url: None,
            deeplink_url: Some(String::from("gojek://gopay/merchanttransfer")),
            qr_code_url: None,
        })
    }

    fn verify_notification(&self, _notification: &GatewayNotification) -> bool {
        !self.reject_signatures.load(Ordering::SeqCst)
    }
}

pub struct TestServer {
    pub app: Router,
    pub store: Arc<InMemoryStore>,
    pub gateway: Arc<StubGateway>,
    pub verifier: Arc<TokenVerifier>,
}

/// A week from today in the service offset, so bookings are never in the past.
pub fn service_date() -> Date {
    (OffsetDateTime::now_utc().to_offset(offset!(+7)) + Duration::days(7)).date()
}

pub fn create_test_server() -> TestServer {
    let store = Arc::new(InMemoryStore::new());
    store
        .put_cleaner(CleanerProfile {
            id: CLEANER_ID,
            user_id: CLEANER_USER_ID,
            full_name: Some(String::from("Rina")),
            phone: None,
            is_available: true,
            account_active: true,
        })
        .unwrap();
    store
        .put_service(ServiceOffering {
            id: SERVICE_ID,
            name: String::from("Deep Cleaning"),
            description: None,
            is_active: true,
        })
        .unwrap();
    store
        .put_schedule(WeeklyScheduleEntry {
            cleaner_id: CLEANER_ID,
            day_of_week: DayOfWeek::of(service_date()),
            start_time: "08:00".parse().unwrap(),
            end_time: "17:00".parse().unwrap(),
            is_available: true,
        })
        .unwrap();
    store
        .put_customer(CustomerContact {
            user_id: CUSTOMER_ID,
            full_name: String::from("Teuku Ahmad"),
            email: Some(String::from("ahmad@example.com")),
            phone: Some(String::from("081234567890")),
        })
        .unwrap();
    store
        .put_payment_method(PaymentMethod {
            id: METHOD_ID,
            user_id: CUSTOMER_ID,
            method_type: PaymentMethodType::Ewallet,
            provider: String::from("gopay"),
            account_number: String::from("081234567890"),
            account_name: String::from("Teuku Ahmad"),
            is_active: true,
        })
        .unwrap();

    let gateway = Arc::new(StubGateway::default());
    let lifecycle = OrderLifecycle::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        LifecyclePolicy::default(),
    );
    let reconciler = PaymentReconciler::new(lifecycle.clone(), gateway.clone(), None);
    let verifier = Arc::new(TokenVerifier::new(JWT_SECRET));

    let app_state = AppState {
        lifecycle,
        reconciler,
        verifier: verifier.clone(),
    };

    TestServer {
        app: build_router(app_state, cors_layer("*")),
        store,
        gateway,
        verifier,
    }
}

impl TestServer {
    pub fn token_for(&self, user_id: Uuid, user_type: UserType) -> String {
        let actor = AuthenticatedActor::new(user_id, None, user_type);
        self.verifier
            .issue(&actor, OffsetDateTime::now_utc() + Duration::hours(1))
            .unwrap()
    }

    pub fn customer_token(&self) -> String {
        self.token_for(CUSTOMER_ID, UserType::Customer)
    }

    pub fn cleaner_token(&self) -> String {
        self.token_for(CLEANER_USER_ID, UserType::Cleaner)
    }

    pub fn admin_token(&self) -> String {
        self.token_for(ADMIN_ID, UserType::Admin)
    }

    /// Sends a request and returns the status with the parsed JSON body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap()
        };
        (status, body)
    }

    /// Books the default order and returns its id.
    pub async fn create_order(&self) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/api/v1/orders",
                Some(&self.customer_token()),
                &create_order_body(),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Books and confirms the default order and returns its id.
    pub async fn create_confirmed_order(&self) -> String {
        let order_id = self.create_order().await;
        let (status, body) = self
            .send(json_request(
                "PUT",
                &format!("/api/v1/orders/{order_id}/status"),
                Some(&self.cleaner_token()),
                &json!({ "status": "confirmed" }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        order_id
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// 150 000 base + 30 000 add-ons + 10 000 default fee + 19 800 tax.
pub fn create_order_body() -> Value {
    json!({
        "cleanerId": CLEANER_ID.to_string(),
        "serviceId": SERVICE_ID.to_string(),
        "serviceDate": service_date()
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap(),
        "startTime": "09:00",
        "endTime": "11:00",
        "serviceAddress": "Jl. Teuku Umar No. 5, Banda Aceh",
        "basePrice": 150_000,
        "additionalServices": ["Ironing"],
        "additionalServicesPrice": 30_000,
        "totalPrice": 209_800
    })
}
