// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::gateway::ChargeResponse;
use clean_aceh_audit::StatusHistoryEntry;
use clean_aceh_domain::{Order, OrderStatus, Payment};

/// The result of a status transition.
///
/// Every successful transition produces exactly one history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The order after the transition.
    pub order: Order,
    /// The history entry describing it.
    pub history: StatusHistoryEntry,
}

/// The result of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationResult {
    /// The cancelled order.
    pub order: Order,
    /// Disclosed cancellation fee; not charged.
    pub cancellation_fee: i64,
    /// Recorded reason.
    pub reason: String,
}

/// An order with its history and payments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    /// The order.
    pub order: Order,
    /// Status history, oldest first.
    pub history: Vec<StatusHistoryEntry>,
    /// Payments, oldest first.
    pub payments: Vec<Payment>,
}

/// Order counts per status and the most recent orders, for a dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderStats {
    /// All orders in scope.
    pub total: u64,
    /// Orders awaiting confirmation.
    pub pending: u64,
    /// Confirmed orders not yet started.
    pub confirmed: u64,
    /// Cleaner travelling to the customer.
    pub on_the_way: u64,
    /// Work underway.
    pub in_progress: u64,
    /// Finished orders.
    pub completed: u64,
    /// Cancelled orders.
    pub cancelled: u64,
    /// Newest orders first.
    pub recent_orders: Vec<Order>,
}

impl OrderStats {
    /// Counts `statuses` and attaches `recent_orders`.
    #[must_use]
    pub fn tally(statuses: &[OrderStatus], recent_orders: Vec<Order>) -> Self {
        let mut stats = Self {
            recent_orders,
            ..Self::default()
        };
        for status in statuses {
            stats.total += 1;
            match status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Confirmed => stats.confirmed += 1,
                OrderStatus::OnTheWay => stats.on_the_way += 1,
                OrderStatus::InProgress => stats.in_progress += 1,
                OrderStatus::Completed => stats.completed += 1,
                OrderStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }
}

/// A created payment and the gateway's charge details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// The stored payment.
    pub payment: Payment,
    /// What the customer needs to complete the payment.
    pub charge: ChargeResponse,
}

/// What a gateway notification did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The payment moved to a new status.
    Applied {
        /// The payment after the update.
        payment: Payment,
        /// Whether the order was moved to `confirmed` as a result.
        order_confirmed: bool,
    },
    /// The payment already had this status, or the notification arrived
    /// out of order; nothing changed.
    Unchanged {
        /// The payment as found.
        payment: Payment,
    },
    /// The notification carried no actionable status.
    Ignored {
        /// The gateway's transaction status.
        transaction_status: String,
    },
}
