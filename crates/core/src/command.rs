// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clean_aceh_domain::{
    OrderSort, OrderStatus, PageRequest, PaymentStatus, SortDirection, TimeOfDay,
};
use time::Date;
use uuid::Uuid;

/// A customer's request to book a cleaner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    /// The cleaner profile to book.
    pub cleaner_id: Uuid,
    /// The service to perform.
    pub service_id: Uuid,
    /// A saved address, if one was selected.
    pub address_id: Option<Uuid>,
    /// The address text.
    pub service_address: String,
    /// Service date in the service timezone.
    pub service_date: Date,
    /// Requested start.
    pub start_time: TimeOfDay,
    /// Requested end.
    pub end_time: Option<TimeOfDay>,
    /// Service base price.
    pub base_price: i64,
    /// Add-on total.
    pub add_ons_price: i64,
    /// Platform fee; the configured default when absent.
    pub platform_fee: Option<i64>,
    /// Tax as computed by the client.
    pub tax_amount: Option<i64>,
    /// Total shown to the customer.
    pub total_price: i64,
    /// Add-on names.
    pub additional_services: Vec<String>,
    /// Notes for the cleaner.
    pub special_instructions: Option<String>,
}

/// A request to move an order to another status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeStatus {
    /// The order.
    pub order_id: Uuid,
    /// Requested status.
    pub target: OrderStatus,
    /// Note for the history.
    pub note: Option<String>,
}

/// A request to cancel an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOrder {
    /// The order.
    pub order_id: Uuid,
    /// Why it is being cancelled.
    pub reason: Option<String>,
}

/// A customer's request to pay for a confirmed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatePayment {
    /// The order.
    pub order_id: Uuid,
    /// A saved payment method of the customer.
    pub payment_method_id: Uuid,
}

/// Filters, order and page of an order listing.
///
/// An empty `statuses` list matches every status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOrders {
    /// Statuses to include.
    pub statuses: Vec<OrderStatus>,
    /// Sort column.
    pub sort: OrderSort,
    /// Sort direction.
    pub direction: SortDirection,
    /// The page to return.
    pub page: PageRequest,
}

/// Filter and page of a customer's payment history, newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListPayments {
    /// Only payments in this status.
    pub status: Option<PaymentStatus>,
    /// The page to return.
    pub page: PageRequest,
}
