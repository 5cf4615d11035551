// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::order_status::OrderStatus;
use crate::payment::PaymentStatus;
use crate::schedule::BookingRejection;
use uuid::Uuid;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A request field is malformed or out of range.
    InvalidInput {
        /// The offending field.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },
    /// The string is not a known order status.
    InvalidOrderStatus {
        /// The rejected value.
        status: String,
    },
    /// The string is not a known payment status.
    InvalidPaymentStatus {
        /// The rejected value.
        status: String,
    },
    /// The string is not a known user type.
    InvalidUserType(String),
    /// The string is not a known payment method type.
    InvalidPaymentMethodType(String),
    /// The order status transition is not in the transition table.
    InvalidStatusTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
    /// The requester may not perform the action on this resource.
    Forbidden {
        /// The attempted action.
        action: &'static str,
        /// Why the request was refused.
        reason: String,
    },
    /// The order cannot be cancelled by this requester in its current status.
    NotCancellable {
        /// The order's current status.
        status: OrderStatus,
        /// Why the cancellation was refused.
        reason: String,
    },
    /// The requested service date is before today.
    PastServiceDate {
        /// The requested date.
        service_date: time::Date,
        /// The current date in the service timezone.
        today: time::Date,
    },
    /// The client-submitted total disagrees with the computed total.
    PriceMismatch {
        /// Total claimed by the client.
        claimed: i64,
        /// Total computed from the price components.
        computed: i64,
    },
    /// The cleaner cannot take the booking.
    NotBookable(BookingRejection),
    /// The cleaner's account is not active.
    CleanerInactive {
        /// The cleaner profile.
        cleaner_id: Uuid,
    },
    /// The cleaner has switched availability off.
    CleanerUnavailable {
        /// The cleaner profile.
        cleaner_id: Uuid,
    },
    /// The service is not currently offered.
    ServiceInactive {
        /// The service.
        service_id: Uuid,
    },
    /// A payment can only be created for a confirmed order.
    OrderNotConfirmed {
        /// The order's current status.
        status: OrderStatus,
    },
    /// The order already has a pending or paid payment.
    PaymentAlreadyExists {
        /// The order.
        order_id: Uuid,
        /// Status of the existing payment.
        status: PaymentStatus,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid value for '{field}': {message}")
            }
            Self::InvalidOrderStatus { status } => write!(f, "Invalid order status: '{status}'"),
            Self::InvalidPaymentStatus { status } => {
                write!(f, "Invalid payment status: '{status}'")
            }
            Self::InvalidUserType(value) => write!(f, "Invalid user type: '{value}'"),
            Self::InvalidPaymentMethodType(value) => {
                write!(f, "Invalid payment method type: '{value}'")
            }
            Self::InvalidStatusTransition { from, to } => {
                write!(f, "Order status cannot change from {from} to {to}")
            }
            Self::Forbidden { action, reason } => write!(f, "Not allowed to {action}: {reason}"),
            Self::NotCancellable { status, reason } => {
                write!(f, "Order in status {status} cannot be cancelled: {reason}")
            }
            Self::PastServiceDate {
                service_date,
                today,
            } => write!(
                f,
                "Service date {service_date} is in the past (today is {today})"
            ),
            Self::PriceMismatch { claimed, computed } => write!(
                f,
                "Total price {claimed} does not match the computed total {computed}"
            ),
            Self::NotBookable(rejection) => write!(f, "Cleaner is not bookable: {rejection}"),
            Self::CleanerInactive { cleaner_id } => {
                write!(f, "Cleaner {cleaner_id} is not active")
            }
            Self::CleanerUnavailable { cleaner_id } => {
                write!(f, "Cleaner {cleaner_id} is not accepting orders")
            }
            Self::ServiceInactive { service_id } => {
                write!(f, "Service {service_id} is not currently offered")
            }
            Self::OrderNotConfirmed { status } => write!(
                f,
                "Payment requires a confirmed order, but the order is {status}"
            ),
            Self::PaymentAlreadyExists { order_id, status } => write!(
                f,
                "Order {order_id} already has a {status} payment"
            ),
        }
    }
}

impl std::error::Error for DomainError {}
