// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! JSON bodies of the Core API charge endpoint.

use clean_aceh::{ChargeRequest, ChargeResponse, GatewayError};
use clean_aceh_domain::PaymentChannel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChargeBody<'a> {
    pub payment_type: &'static str,
    pub transaction_details: TransactionDetails<'a>,
    pub customer_details: CustomerDetails<'a>,
    pub item_details: Vec<ItemDetail<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gopay: Option<GopayOptions<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TransactionDetails<'a> {
    pub order_id: &'a str,
    pub gross_amount: i64,
}

#[derive(Debug, Serialize)]
pub struct CustomerDetails<'a> {
    pub first_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct ItemDetail<'a> {
    pub id: &'a str,
    pub price: i64,
    pub quantity: u32,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GopayOptions<'a> {
    pub enable_callback: bool,
    pub callback_url: &'a str,
}

impl<'a> From<&'a ChargeRequest> for ChargeBody<'a> {
    fn from(request: &'a ChargeRequest) -> Self {
        let gopay = match (request.channel, request.callback_url.as_deref()) {
            (PaymentChannel::Gopay, Some(callback_url)) => Some(GopayOptions {
                enable_callback: true,
                callback_url,
            }),
            _ => None,
        };
        Self {
            payment_type: request.channel.as_str(),
            transaction_details: TransactionDetails {
                order_id: &request.reference,
                gross_amount: request.amount,
            },
            customer_details: CustomerDetails {
                first_name: &request.customer.full_name,
                email: request.customer.email.as_deref(),
                phone: request.customer.phone.as_deref(),
            },
            item_details: request
                .items
                .iter()
                .map(|item| ItemDetail {
                    id: &item.id,
                    price: item.price,
                    quantity: item.quantity,
                    name: &item.name,
                })
                .collect(),
            gopay,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeAction {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeReply {
    pub status_code: Option<String>,
    pub status_message: Option<String>,
    pub transaction_id: Option<String>,
    pub transaction_status: Option<String>,
    pub payment_type: Option<String>,
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub actions: Vec<ChargeAction>,
}

impl ChargeReply {
    fn action_url(&self, name: &str) -> Option<String> {
        self.actions
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.url.clone())
    }

    /// Interprets the reply. Midtrans reports failures in the body's
    /// `status_code`, often with an HTTP 200.
    pub fn into_response(self) -> Result<ChargeResponse, GatewayError> {
        let deeplink_url = self.action_url("deeplink-redirect");
        let qr_code_url = self.action_url("generate-qr-code");
        let status_code = self.status_code.unwrap_or_default();
        if !status_code.starts_with('2') {
            return Err(GatewayError::Rejected {
                status_code,
                message: self.status_message.unwrap_or_default(),
            });
        }
        let Some(transaction_id) = self.transaction_id else {
            return Err(GatewayError::InvalidResponse(String::from(
                "charge accepted without a transaction_id",
            )));
        };
        Ok(ChargeResponse {
            transaction_id,
            transaction_status: self
                .transaction_status
                .unwrap_or_else(|| String::from("pending")),
            payment_type: self.payment_type.unwrap_or_default(),
            redirect_url: self.redirect_url,
            deeplink_url,
            qr_code_url,
        })
    }
}
