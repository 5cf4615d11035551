// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payments, saved payment methods, and gateway status mapping.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// Status of a payment.
///
/// `pending` may become `paid` or `failed`; `paid` may become `refunded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Charge requested, outcome unknown.
    Pending,
    /// Funds captured.
    Paid,
    /// Charge denied, expired, or cancelled.
    Failed,
    /// Funds returned to the customer.
    Refunded,
}

impl PaymentStatus {
    /// Returns the string representation used by the store.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Parses a status string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a known status.
    pub fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(DomainError::InvalidPaymentStatus {
                status: s.to_string(),
            }),
        }
    }

    /// A pending or paid payment blocks creating another for the same order.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Paid)
    }

    /// Whether the payment state machine allows moving to `target`.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Paid | Self::Failed) | (Self::Paid, Self::Refunded)
        )
    }

    /// Maps a gateway notification onto a local status.
    ///
    /// Returns `None` for transaction states that carry no decision
    /// (for example `authorize` or a `challenge` fraud verdict).
    #[must_use]
    pub fn from_gateway(transaction_status: &str, fraud_status: Option<&str>) -> Option<Self> {
        match transaction_status {
            "capture" | "settlement" => match fraud_status {
                None | Some("accept") => Some(Self::Paid),
                Some(_) => None,
            },
            "pending" => Some(Self::Pending),
            "deny" | "expire" | "cancel" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A charge attempt for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    /// Payment id.
    pub id: Uuid,
    /// The order being paid.
    pub order_id: Uuid,
    /// The saved method used.
    pub payment_method_id: Uuid,
    /// Amount charged, in minor units.
    pub amount: i64,
    /// Current status.
    pub status: PaymentStatus,
    /// Our reference, sent to the gateway as its order id.
    pub reference: String,
    /// The gateway's own transaction id, once known.
    pub transaction_id: Option<String>,
    /// When the payment became `paid`.
    pub paid_at: Option<OffsetDateTime>,
    /// Creation time.
    pub created_at: OffsetDateTime,
}

impl Payment {
    /// A pending payment the gateway never acknowledged.
    ///
    /// No transaction id was recorded, so no notification will arrive for
    /// it and the charge can be sent again under the same reference.
    #[must_use]
    pub const fn awaiting_charge(&self) -> bool {
        matches!(self.status, PaymentStatus::Pending) && self.transaction_id.is_none()
    }
}

/// Kind of saved payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodType {
    /// Bank virtual account.
    BankTransfer,
    /// E-wallet such as GoPay or OVO.
    Ewallet,
}

impl PaymentMethodType {
    /// Returns the string representation used by the store.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::Ewallet => "ewallet",
        }
    }
}

impl FromStr for PaymentMethodType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank_transfer" => Ok(Self::BankTransfer),
            "ewallet" => Ok(Self::Ewallet),
            _ => Err(DomainError::InvalidPaymentMethodType(s.to_string())),
        }
    }
}

/// How the gateway should collect the money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentChannel {
    /// GoPay e-wallet.
    Gopay,
    /// DANA e-wallet.
    Dana,
    /// OVO e-wallet.
    Ovo,
    /// LinkAja e-wallet.
    Linkaja,
    /// ShopeePay e-wallet.
    Shopeepay,
    /// Bank virtual account.
    BankTransfer,
}

impl PaymentChannel {
    /// The gateway's `payment_type` value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gopay => "gopay",
            Self::Dana => "dana",
            Self::Ovo => "ovo",
            Self::Linkaja => "linkaja",
            Self::Shopeepay => "shopeepay",
            Self::BankTransfer => "bank_transfer",
        }
    }
}

/// A user's saved payment method. Deactivated rather than deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod {
    /// Method id.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Bank or e-wallet.
    pub method_type: PaymentMethodType,
    /// Provider name, for example "gopay" or "bca".
    pub provider: String,
    /// Account or phone number.
    pub account_number: String,
    /// Account holder.
    pub account_name: String,
    /// Soft-delete flag.
    pub is_active: bool,
}

impl PaymentMethod {
    /// The gateway channel for this method.
    ///
    /// Unknown e-wallet providers fall back to GoPay.
    #[must_use]
    pub fn channel(&self) -> PaymentChannel {
        match self.method_type {
            PaymentMethodType::BankTransfer => PaymentChannel::BankTransfer,
            PaymentMethodType::Ewallet => match self.provider.to_ascii_lowercase().as_str() {
                "dana" => PaymentChannel::Dana,
                "ovo" => PaymentChannel::Ovo,
                "linkaja" => PaymentChannel::Linkaja,
                "shopeepay" => PaymentChannel::Shopeepay,
                _ => PaymentChannel::Gopay,
            },
        }
    }
}

/// Builds the merchant reference sent to the gateway:
/// `CA-{order_number}-{epoch millis}`.
#[must_use]
pub fn generate_payment_reference(order_number: &str, now: OffsetDateTime) -> String {
    format!("CA-{order_number}-{}", now.unix_timestamp_nanos() / 1_000_000)
}
