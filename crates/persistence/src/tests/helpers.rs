// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! A stand-in `PostgREST` server that records requests and replays
//! canned responses in order.

use crate::SupabaseStore;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_RANGE;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const SERVICE_KEY: &str = "service-role-key";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Value,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone, Default)]
struct StubState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responses: Arc<Mutex<VecDeque<Canned>>>,
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: Value,
    content_range: Option<String>,
}

pub struct StubPostgrest {
    state: StubState,
    pub store: SupabaseStore,
}

impl StubPostgrest {
    pub async fn spawn() -> Self {
        let state = StubState::default();
        let app = Router::new().fallback(record).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            state,
            store: SupabaseStore::connect(&format!("http://{addr}"), SERVICE_KEY),
        }
    }

    /// Queues the response for the next request.
    pub fn respond(&self, status: StatusCode, body: Value) {
        self.queue(Canned {
            status,
            body,
            content_range: None,
        });
    }

    /// Queues `rows` as one page of a counted read matching `total` rows.
    pub fn respond_page(&self, rows: Value, total: u64) {
        let shown = rows.as_array().map_or(0, Vec::len);
        let range = if shown == 0 {
            format!("*/{total}")
        } else {
            format!("0-{}/{total}", shown - 1)
        };
        self.queue(Canned {
            status: StatusCode::OK,
            body: rows,
            content_range: Some(range),
        });
    }

    fn queue(&self, canned: Canned) {
        self.state.responses.lock().unwrap().push_back(canned);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        params,
        headers,
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });
    let canned = state.responses.lock().unwrap().pop_front();
    let Some(canned) = canned else {
        return (StatusCode::OK, axum::Json(json!([]))).into_response();
    };
    let mut response = (canned.status, axum::Json(canned.body)).into_response();
    if let Some(range) = canned.content_range {
        response
            .headers_mut()
            .insert(CONTENT_RANGE, range.parse().unwrap());
    }
    response
}

pub fn order_row(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "order_number": "CA601234042",
        "customer_id": "00000000-0000-0000-0000-0000000000c1",
        "cleaner_id": "00000000-0000-0000-0000-0000000000c2",
        "service_id": "00000000-0000-0000-0000-0000000000c3",
        "address_id": null,
        "service_address": "Jl. Teuku Umar 12, Banda Aceh",
        "status": status,
        "service_date": "2026-03-10",
        "start_time": "10:00:00",
        "end_time": "12:00:00",
        "base_price": 150_000,
        "additional_services_price": 30000,
        "platform_fee": 10000,
        "tax_amount": 19800,
        "total_price": 209_800,
        "additional_services": [],
        "special_instructions": null,
        "created_at": "2026-03-05T01:00:00+00:00",
        "confirmed_at": null,
        "started_at": null,
        "completed_at": null,
        "cancelled_at": null,
        "updated_at": "2026-03-05T01:00:00+00:00"
    })
}

pub fn payment_row(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "order_id": "00000000-0000-0000-0000-0000000000a1",
        "payment_method_id": "00000000-0000-0000-0000-0000000000a2",
        "amount": "209800.00",
        "status": status,
        "payment_reference": "CA-CA601234042-1772672400000",
        "gateway_transaction_id": null,
        "paid_at": null,
        "created_at": "2026-03-05T02:00:00+00:00"
    })
}

/// A payment row with its order embedded, as read for payment history.
pub fn payment_record_row(id: &str, status: &str) -> Value {
    let mut row = payment_row(id, status);
    row["orders"] = json!({
        "order_number": "CA601234042",
        "service_date": "2026-03-10",
        "customer_id": "00000000-0000-0000-0000-0000000000c1"
    });
    row
}
