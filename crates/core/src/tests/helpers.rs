// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::memory::InMemoryStore;
use crate::{
    ChangeStatus, ChargeRequest, ChargeResponse, CreateOrder, GatewayError, GatewayNotification,
    LifecyclePolicy, OrderLifecycle, PaymentGateway, PaymentReconciler,
};
use async_trait::async_trait;
use clean_aceh_domain::{
    Address, CleanerProfile, CustomerContact, DayOfWeek, Order, OrderStatus, PaymentMethod,
    PaymentMethodType, Requester, ServiceOffering, TimeOfDay, UserType, WeeklyScheduleEntry,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

pub const CUSTOMER_ID: Uuid = Uuid::from_u128(0x0100);
pub const OTHER_CUSTOMER_ID: Uuid = Uuid::from_u128(0x0101);
pub const CLEANER_ID: Uuid = Uuid::from_u128(0x0200);
pub const CLEANER_USER_ID: Uuid = Uuid::from_u128(0x0201);
pub const ADMIN_ID: Uuid = Uuid::from_u128(0x0300);
pub const SERVICE_ID: Uuid = Uuid::from_u128(0x0500);
pub const ADDRESS_ID: Uuid = Uuid::from_u128(0x0600);
pub const METHOD_ID: Uuid = Uuid::from_u128(0x0700);

/// Thursday morning in Banda Aceh.
pub const NOW: OffsetDateTime = datetime!(2026-03-05 08:00 +07:00);
/// The following Tuesday.
pub const SERVICE_DATE: Date = date!(2026 - 03 - 10);

pub fn customer() -> Requester {
    Requester::new(CUSTOMER_ID, UserType::Customer)
}

pub fn cleaner() -> Requester {
    Requester::new(CLEANER_USER_ID, UserType::Cleaner)
}

pub fn admin() -> Requester {
    Requester::new(ADMIN_ID, UserType::Admin)
}

pub fn hm(raw: &str) -> TimeOfDay {
    raw.parse().unwrap()
}

/// A payment gateway that records charges and answers from a script.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    pub charges: Mutex<Vec<ChargeRequest>>,
    pub fail_charges: AtomicBool,
    pub reject_signatures: AtomicBool,
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, GatewayError> {
        self.charges.lock().unwrap().push(request.clone());
        if self.fail_charges.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport(String::from("connection reset")));
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

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub gateway: Arc<ScriptedGateway>,
    pub lifecycle: OrderLifecycle,
    pub reconciler: PaymentReconciler,
}

pub fn create_fixture() -> Fixture {
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
        .put_address(Address {
            id: ADDRESS_ID,
            user_id: CUSTOMER_ID,
            label: Some(String::from("Home")),
            full_address: String::from("Jl. Teuku Umar No. 5"),
            city: Some(String::from("Banda Aceh")),
        })
        .unwrap();
    store
        .put_schedule(WeeklyScheduleEntry {
            cleaner_id: CLEANER_ID,
            day_of_week: DayOfWeek::of(SERVICE_DATE),
            start_time: hm("08:00"),
            end_time: hm("17:00"),
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

    let gateway = Arc::new(ScriptedGateway::default());
    let lifecycle = OrderLifecycle::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        LifecyclePolicy::default(),
    );
    let reconciler = PaymentReconciler::new(
        lifecycle.clone(),
        gateway.clone(),
        Some(String::from("https://cleanaceh.example/payment/result")),
    );

    Fixture {
        store,
        gateway,
        lifecycle,
        reconciler,
    }
}

/// 150 000 base + 30 000 add-ons + 10 000 default fee + 19 800 tax.
pub fn create_order_command() -> CreateOrder {
    CreateOrder {
        cleaner_id: CLEANER_ID,
        service_id: SERVICE_ID,
        address_id: Some(ADDRESS_ID),
        service_address: String::from("Jl. Teuku Umar No. 5, Banda Aceh"),
        service_date: SERVICE_DATE,
        start_time: hm("09:00"),
        end_time: Some(hm("11:00")),
        base_price: 150_000,
        add_ons_price: 30_000,
        platform_fee: None,
        tax_amount: None,
        total_price: 209_800,
        additional_services: vec![String::from("Ironing")],
        special_instructions: Some(String::from("Please bring a ladder")),
    }
}

pub async fn create_pending_order(fx: &Fixture) -> Order {
    fx.lifecycle
        .create_order(&customer(), create_order_command(), NOW)
        .await
        .unwrap()
}

pub async fn move_order(fx: &Fixture, order: &Order, targets: &[OrderStatus]) -> Order {
    let mut current = order.clone();
    for &target in targets {
        current = fx
            .lifecycle
            .update_order_status(
                &cleaner(),
                ChangeStatus {
                    order_id: current.id,
                    target,
                    note: None,
                },
                NOW,
            )
            .await
            .unwrap()
            .order;
    }
    current
}

pub async fn create_confirmed_order(fx: &Fixture) -> Order {
    let order = create_pending_order(fx).await;
    move_order(fx, &order, &[OrderStatus::Confirmed]).await
}
