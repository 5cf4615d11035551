// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::MidtransConfig;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use clean_aceh::{ChargeItem, ChargeRequest, GatewayNotification};
use clean_aceh_domain::{CustomerContact, PaymentChannel};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const SERVER_KEY: &str = "SB-Mid-server-test";
pub const REFERENCE: &str = "CA-CA601234042-1772672400000";

pub fn config(verify_signatures: bool) -> MidtransConfig {
    MidtransConfig {
        server_key: String::from(SERVER_KEY),
        is_production: false,
        verify_signatures,
    }
}

pub fn charge_request(channel: PaymentChannel) -> ChargeRequest {
    ChargeRequest {
        reference: String::from(REFERENCE),
        amount: 209_800,
        channel,
        customer: CustomerContact {
            user_id: Uuid::from_u128(0xc1),
            full_name: String::from("Cut Meutia"),
            email: Some(String::from("cut@example.com")),
            phone: None,
        },
        items: vec![ChargeItem {
            id: String::from("CA601234042"),
            name: String::from("Cleaning service #CA601234042"),
            price: 209_800,
            quantity: 1,
        }],
        callback_url: Some(String::from("https://cleanaceh.example/payment/result")),
    }
}

pub fn notification(transaction_status: &str) -> GatewayNotification {
    GatewayNotification {
        order_id: String::from(REFERENCE),
        transaction_id: Some(String::from("b6a5f8c2")),
        transaction_status: transaction_status.to_string(),
        fraud_status: None,
        status_code: Some(String::from("200")),
        gross_amount: Some(String::from("209800.00")),
        signature_key: None,
    }
}

/// The body and headers the stub charge endpoint received.
#[derive(Debug, Clone)]
pub struct CapturedCharge {
    pub body: Value,
    pub authorization: Option<String>,
}

#[derive(Clone)]
struct ChargeStub {
    captured: Arc<Mutex<Vec<CapturedCharge>>>,
    reply: (StatusCode, String),
}

async fn charge(
    State(stub): State<ChargeStub>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    stub.captured.lock().unwrap().push(CapturedCharge {
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    });
    stub.reply.clone()
}

/// Starts a stub Core API answering every charge with `reply`.
pub async fn spawn_charge_server(
    status: StatusCode,
    reply: String,
) -> (String, Arc<Mutex<Vec<CapturedCharge>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v2/charge", post(charge))
        .with_state(ChargeStub {
            captured: Arc::clone(&captured),
            reply: (status, reply),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{addr}"), captured)
}
