// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use clean_aceh::CoreError;
use clean_aceh_domain::{BookingRejection, DomainError};

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token was presented.
    MissingToken,
    /// The token is malformed, badly signed, or names an unknown user.
    InvalidToken,
    /// The token's expiry has passed.
    TokenExpired,
    /// A token could not be signed.
    IssueFailed {
        /// The reason signing failed.
        reason: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingToken => write!(f, "Access token required"),
            Self::InvalidToken => write!(f, "Invalid token"),
            Self::TokenExpired => write!(f, "Token expired"),
            Self::IssueFailed { reason } => write!(f, "Token could not be issued: {reason}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The requester may not act on this resource.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Why it was refused.
        reason: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request collides with existing state.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The payment gateway failed.
    PaymentGateway {
        /// Detail for the logs; never shown to clients.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Forbidden { action, reason } => {
                write!(f, "Forbidden: '{action}': {reason}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::PaymentGateway { message } => write!(f, "Payment gateway error: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// The message shown to clients.
    ///
    /// Gateway and internal failures are reduced to a generic message; the
    /// detail stays in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::AuthenticationFailed { reason } | Self::Forbidden { reason, .. } => {
                reason.clone()
            }
            Self::DomainRuleViolation { message, .. }
            | Self::InvalidInput { message, .. }
            | Self::ResourceNotFound { message, .. }
            | Self::Conflict { message } => message.clone(),
            Self::PaymentGateway { .. } => String::from("Payment could not be processed"),
            Self::Internal { .. } => String::from("Internal server error"),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::IssueFailed { reason } => Self::Internal { message: reason },
            other => Self::AuthenticationFailed {
                reason: other.to_string(),
            },
        }
    }
}

fn rule(rule: &str, err: &DomainError) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: String::from(rule),
        message: err.to_string(),
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidInput { field, message } => ApiError::InvalidInput {
            field: field.to_string(),
            message,
        },
        DomainError::InvalidOrderStatus { status } => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("'{status}' is not an order status"),
        },
        DomainError::InvalidPaymentStatus { status } => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("'{status}' is not a payment status"),
        },
        DomainError::InvalidUserType(value) => ApiError::InvalidInput {
            field: String::from("userType"),
            message: format!("'{value}' is not a user type"),
        },
        DomainError::Forbidden { action, reason } => ApiError::Forbidden {
            action: action.to_string(),
            reason,
        },
        DomainError::NotBookable(BookingRejection::DoubleBooked { .. })
        | DomainError::PaymentAlreadyExists { .. } => ApiError::Conflict {
            message: err.to_string(),
        },
        DomainError::NotBookable(_) => rule("cleaner_schedule", &err),
        DomainError::InvalidStatusTransition { .. } => rule("status_transition", &err),
        DomainError::NotCancellable { .. } => rule("cancellation", &err),
        DomainError::PastServiceDate { .. } => rule("service_date", &err),
        DomainError::PriceMismatch { .. } => rule("price_total", &err),
        DomainError::CleanerInactive { .. } | DomainError::CleanerUnavailable { .. } => {
            rule("cleaner_available", &err)
        }
        DomainError::ServiceInactive { .. } => rule("service_active", &err),
        DomainError::OrderNotConfirmed { .. } => rule("payment_requires_confirmed_order", &err),
        DomainError::InvalidPaymentMethodType(value) => ApiError::Internal {
            message: format!("stored payment method has unknown type '{value}'"),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::NotFound { resource, id } => ApiError::ResourceNotFound {
            resource_type: capitalize(resource),
            message: format!("{} '{id}' not found", capitalize(resource)),
        },
        CoreError::Conflict { resource, message } => ApiError::Conflict {
            message: format!(
                "{} conflicts with an existing record: {message}",
                capitalize(resource)
            ),
        },
        CoreError::ConcurrentModification {
            resource,
            expected,
            actual,
        } => ApiError::Conflict {
            message: format!(
                "{} changed while the request was processed (expected {expected}, now {actual})",
                capitalize(resource)
            ),
        },
        CoreError::InvalidSignature => ApiError::Forbidden {
            action: String::from("payment_notification"),
            reason: String::from("Invalid signature"),
        },
        CoreError::Gateway(gateway_err) => ApiError::PaymentGateway {
            message: gateway_err.to_string(),
        },
        CoreError::Store(store_err) => ApiError::Internal {
            message: store_err.to_string(),
        },
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
