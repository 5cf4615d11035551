// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use async_trait::async_trait;
use clean_aceh::memory::InMemoryStore;
use clean_aceh::{
    ChargeRequest, ChargeResponse, GatewayError, GatewayNotification, LifecyclePolicy,
    OrderLifecycle, PaymentGateway, PaymentReconciler,
};
use clean_aceh_domain::{
    CleanerProfile, CustomerContact, DayOfWeek, PaymentMethod, PaymentMethodType,
    ServiceOffering, UserType, WeeklyScheduleEntry,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{AuthenticatedActor, CreateOrderRequest, UpdateOrderStatusRequest};

pub const CUSTOMER_ID: Uuid = Uuid::from_u128(0x0100);
pub const CLEANER_ID: Uuid = Uuid::from_u128(0x0200);
pub const CLEANER_USER_ID: Uuid = Uuid::from_u128(0x0201);
pub const ADMIN_ID: Uuid = Uuid::from_u128(0x0300);
pub const SERVICE_ID: Uuid = Uuid::from_u128(0x0500);
pub const METHOD_ID: Uuid = Uuid::from_u128(0x0700);

pub const NOW: OffsetDateTime = datetime!(2026-03-05 08:00 +07:00);
pub const SERVICE_DATE: Date = date!(2026 - 03 - 10);

pub fn create_test_customer() -> AuthenticatedActor {
    AuthenticatedActor::new(
        CUSTOMER_ID,
        Some(String::from("ahmad@example.com")),
        UserType::Customer,
    )
}

pub fn create_test_cleaner() -> AuthenticatedActor {
    AuthenticatedActor::new(CLEANER_USER_ID, None, UserType::Cleaner)
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(ADMIN_ID, None, UserType::Admin)
}

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
            return Err(GatewayError::Rejected {
                status_code: String::from("500"),
                message: String::from("server key is not valid"),
            });
        }
        Ok(ChargeResponse {
            transaction_id: format!("txn-{}", request.reference),
            transaction_status: String::from("pending"),
            payment_type: request.channel.as_str().to_string(),
            redirect_url: None,
            deeplink_url: Some(String::from("gojek://gopay/merchanttransfer")),
            qr_code_url: Some(String::from("https://pay.example/qr.png")),
        })
    }

    fn verify_notification(&self, _notification: &GatewayNotification) -> bool {
        !self.reject_signatures.load(Ordering::SeqCst)
    }
}

pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub gateway: Arc<StubGateway>,
    pub lifecycle: OrderLifecycle,
    pub reconciler: PaymentReconciler,
}

pub fn create_test_context() -> TestContext {
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
            day_of_week: DayOfWeek::of(SERVICE_DATE),
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

    TestContext {
        store,
        gateway,
        lifecycle,
        reconciler,
    }
}

/// 150 000 base + 30 000 add-ons + 10 000 default fee + 19 800 tax.
pub fn create_valid_order_request() -> CreateOrderRequest {
    CreateOrderRequest {
        cleaner_id: CLEANER_ID.to_string(),
        service_id: SERVICE_ID.to_string(),
        service_date: String::from("2026-03-10"),
        start_time: String::from("09:00"),
        end_time: Some(String::from("11:00")),
        address_id: None,
        service_address: String::from("Jl. Teuku Umar No. 5, Banda Aceh"),
        base_price: 150_000,
        additional_services: vec![String::from("Ironing")],
        additional_services_price: 30_000,
        platform_fee: None,
        tax_amount: None,
        total_price: 209_800,
        special_instructions: None,
    }
}

pub fn status_request(status: &str) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest {
        status: status.to_string(),
        notes: None,
    }
}
