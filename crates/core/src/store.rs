// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Storage ports used by the lifecycle manager.
//!
//! State changes go through compare-and-set operations keyed on the
//! current status, so two racing requests cannot both apply a transition.
//! Inserts that would break a uniqueness rule (a second active order for
//! a cleaner on one day, a second active payment for an order) fail with
//! [`StoreError::Conflict`] atomically inside the store.

use crate::command::{ListOrders, ListPayments};
use async_trait::async_trait;
use clean_aceh_audit::StatusHistoryEntry;
use clean_aceh_domain::{
    Address, CleanerProfile, CustomerContact, DayOfWeek, Order, OrderStatus, Payment,
    PaymentMethod, PaymentStatus, ServiceOffering, WeeklyScheduleEntry,
};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Errors reported by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness rule rejected the write.
    Conflict {
        /// What was being written.
        resource: &'static str,
        /// Store-provided detail.
        message: String,
    },
    /// The store could not be reached or failed the request.
    Unavailable(String),
    /// A row could not be mapped to a domain value.
    Corrupt {
        /// The table or entity involved.
        resource: &'static str,
        /// Description of the bad data.
        message: String,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict { resource, message } => {
                write!(f, "Conflicting write to {resource}: {message}")
            }
            Self::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
            Self::Corrupt { resource, message } => {
                write!(f, "Invalid {resource} data in store: {message}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Result of a compare-and-set write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasOutcome<T, S> {
    /// The expected state matched and the write was applied.
    Applied(T),
    /// The row does not exist.
    NotFound,
    /// The row was in a different state.
    StateMismatch {
        /// The state actually found.
        actual: S,
    },
}

/// Whose orders a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Orders booked by this customer.
    Customer(Uuid),
    /// Orders assigned to this cleaner profile.
    Cleaner(Uuid),
    /// Every order.
    All,
}

impl OrderScope {
    /// Whether `order` falls inside the scope.
    #[must_use]
    pub fn includes(&self, order: &Order) -> bool {
        match self {
            Self::Customer(customer_id) => order.customer_id == *customer_id,
            Self::Cleaner(cleaner_id) => order.cleaner_id == *cleaner_id,
            Self::All => true,
        }
    }
}

/// One page of a listing and the number of rows matching overall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Matching rows across all pages.
    pub total: u64,
}

/// A payment with the order details shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    /// The payment.
    pub payment: Payment,
    /// Number of the order paid for.
    pub order_number: String,
    /// Service date of the order.
    pub service_date: Date,
    /// The ordering customer.
    pub customer_id: Uuid,
}

impl PaymentRecord {
    /// Pairs a payment with its order.
    #[must_use]
    pub fn new(payment: Payment, order: &Order) -> Self {
        Self {
            payment,
            order_number: order.order_number.clone(),
            service_date: order.service_date,
            customer_id: order.customer_id,
        }
    }
}

/// Orders, their history, and the reference data needed to book them.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Looks up a cleaner profile.
    async fn find_cleaner(&self, cleaner_id: Uuid) -> Result<Option<CleanerProfile>, StoreError>;

    /// Looks up the cleaner profile owned by a user account.
    async fn find_cleaner_by_user(&self, user_id: Uuid)
    -> Result<Option<CleanerProfile>, StoreError>;

    /// Looks up a service offering.
    async fn find_service(&self, service_id: Uuid)
    -> Result<Option<ServiceOffering>, StoreError>;

    /// Looks up an address owned by `owner`.
    ///
    /// Addresses owned by someone else are reported as absent.
    async fn find_address(
        &self,
        address_id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Address>, StoreError>;

    /// The cleaner's weekly schedule entry for one weekday.
    async fn find_schedule(
        &self,
        cleaner_id: Uuid,
        day: DayOfWeek,
    ) -> Result<Option<WeeklyScheduleEntry>, StoreError>;

    /// The cleaner's orders on `date` in a non-terminal status.
    async fn list_active_orders(
        &self,
        cleaner_id: Uuid,
        date: Date,
    ) -> Result<Vec<Order>, StoreError>;

    /// Inserts a new order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the cleaner already holds an
    /// active order on the same date.
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;

    /// Looks up an order.
    async fn find_order(&self, order_id: Uuid) -> Result<Option<Order>, StoreError>;

    /// Replaces the order row with `updated` if its status is still `expected`.
    async fn update_order(
        &self,
        expected: OrderStatus,
        updated: &Order,
    ) -> Result<CasOutcome<Order, OrderStatus>, StoreError>;

    /// Appends one status history entry.
    async fn append_history(&self, entry: &StatusHistoryEntry) -> Result<(), StoreError>;

    /// The order's history, oldest first.
    async fn list_history(&self, order_id: Uuid) -> Result<Vec<StatusHistoryEntry>, StoreError>;

    /// One page of the orders in `scope`, with the total match count.
    async fn list_orders(
        &self,
        scope: OrderScope,
        query: &ListOrders,
    ) -> Result<Page<Order>, StoreError>;

    /// The status of every order in `scope`.
    async fn list_order_statuses(&self, scope: OrderScope) -> Result<Vec<OrderStatus>, StoreError>;
}

/// Payments and the customer data needed to charge them.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Looks up an active payment method owned by `owner`.
    async fn find_payment_method(
        &self,
        method_id: Uuid,
        owner: Uuid,
    ) -> Result<Option<PaymentMethod>, StoreError>;

    /// Contact details for a customer.
    async fn find_customer_contact(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CustomerContact>, StoreError>;

    /// The order's pending or paid payment, if any.
    async fn find_active_payment(&self, order_id: Uuid) -> Result<Option<Payment>, StoreError>;

    /// Inserts a new payment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the order already has a pending
    /// or paid payment.
    async fn insert_payment(&self, payment: &Payment) -> Result<(), StoreError>;

    /// Records the gateway's transaction id on a payment.
    async fn set_payment_transaction_id(
        &self,
        payment_id: Uuid,
        transaction_id: &str,
    ) -> Result<(), StoreError>;

    /// Looks up a payment by the merchant reference sent to the gateway.
    async fn find_payment_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Payment>, StoreError>;

    /// Moves a payment to `target` if its status is still `expected`.
    async fn update_payment_status(
        &self,
        payment_id: Uuid,
        expected: PaymentStatus,
        target: PaymentStatus,
        paid_at: Option<OffsetDateTime>,
    ) -> Result<CasOutcome<Payment, PaymentStatus>, StoreError>;

    /// All payments for an order, oldest first.
    async fn list_payments(&self, order_id: Uuid) -> Result<Vec<Payment>, StoreError>;

    /// Looks up a payment together with its order.
    async fn find_payment(&self, payment_id: Uuid) -> Result<Option<PaymentRecord>, StoreError>;

    /// One page of the payments for orders booked by `customer_id`,
    /// newest first, with the total match count.
    async fn list_customer_payments(
        &self,
        customer_id: Uuid,
        query: &ListPayments,
    ) -> Result<Page<PaymentRecord>, StoreError>;
}
