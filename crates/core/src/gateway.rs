// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment gateway port.

use async_trait::async_trait;
use clean_aceh_domain::{CustomerContact, PaymentChannel};

/// A line item shown on the gateway's payment page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeItem {
    /// Item id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unit price in minor units.
    pub price: i64,
    /// Quantity.
    pub quantity: u32,
}

/// A charge to submit to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    /// Merchant reference; the gateway echoes it back as `order_id`.
    pub reference: String,
    /// Amount in minor units.
    pub amount: i64,
    /// Collection channel.
    pub channel: PaymentChannel,
    /// Customer details.
    pub customer: CustomerContact,
    /// Line items. Their total equals `amount`.
    pub items: Vec<ChargeItem>,
    /// Where e-wallet apps send the customer afterwards.
    pub callback_url: Option<String>,
}

/// The gateway's answer to a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeResponse {
    /// The gateway's transaction id.
    pub transaction_id: String,
    /// Gateway transaction status, usually `pending`.
    pub transaction_status: String,
    /// The channel the gateway used.
    pub payment_type: String,
    /// Web checkout URL.
    pub redirect_url: Option<String>,
    /// App deeplink for e-wallets.
    pub deeplink_url: Option<String>,
    /// QR code image URL.
    pub qr_code_url: Option<String>,
}

/// An asynchronous status notification from the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayNotification {
    /// Our merchant reference.
    pub order_id: String,
    /// The gateway's transaction id.
    pub transaction_id: Option<String>,
    /// Gateway transaction status.
    pub transaction_status: String,
    /// Fraud screening verdict.
    pub fraud_status: Option<String>,
    /// Gateway status code, used for signing.
    pub status_code: Option<String>,
    /// Amount as formatted by the gateway, used for signing.
    pub gross_amount: Option<String>,
    /// Notification signature.
    pub signature_key: Option<String>,
}

/// Errors reported by a gateway implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The gateway could not be reached.
    Transport(String),
    /// The gateway refused the charge.
    Rejected {
        /// Gateway status code.
        status_code: String,
        /// Gateway status message.
        message: String,
    },
    /// The gateway's response could not be understood.
    InvalidResponse(String),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "Payment gateway unreachable: {msg}"),
            Self::Rejected {
                status_code,
                message,
            } => write!(f, "Payment gateway rejected charge ({status_code}): {message}"),
            Self::InvalidResponse(msg) => write!(f, "Unexpected payment gateway response: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// A payment provider able to charge customers and sign notifications.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submits a charge.
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, GatewayError>;

    /// Checks a notification's signature.
    ///
    /// Gateways that do not sign notifications accept everything.
    fn verify_notification(&self, _notification: &GatewayNotification) -> bool {
        true
    }
}
