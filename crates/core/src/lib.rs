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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod command;
mod error;
mod gateway;
mod lifecycle;
pub mod memory;
mod notify;
mod payments;
mod state;
mod store;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::apply_transition;
pub use command::{CancelOrder, ChangeStatus, CreateOrder, CreatePayment, ListOrders, ListPayments};
pub use error::CoreError;
pub use gateway::{
    ChargeItem, ChargeRequest, ChargeResponse, GatewayError, GatewayNotification, PaymentGateway,
};
pub use lifecycle::{LifecyclePolicy, OrderLifecycle};
pub use notify::{CleanerStats, Notification, NotificationKind, NotificationSink};
pub use payments::PaymentReconciler;
pub use state::{
    CancellationResult, OrderDetails, OrderStats, PaymentIntent, TransitionResult, WebhookOutcome,
};
pub use store::{CasOutcome, OrderScope, OrderStore, Page, PaymentRecord, PaymentStore, StoreError};
