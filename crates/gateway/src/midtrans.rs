// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::signature::{notification_signature, signature_matches};
use crate::wire::{ChargeBody, ChargeReply};
use async_trait::async_trait;
use clean_aceh::{ChargeRequest, ChargeResponse, GatewayError, GatewayNotification, PaymentGateway};
use std::time::Duration;
use tracing::{debug, warn};

/// Core API host for sandbox accounts.
pub const SANDBOX_BASE_URL: &str = "https://api.sandbox.midtrans.com";

/// Core API host for production accounts.
pub const PRODUCTION_BASE_URL: &str = "https://api.midtrans.com";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Midtrans account settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidtransConfig {
    /// Server key used for API auth and notification signatures.
    pub server_key: String,
    /// Use the production host instead of the sandbox.
    pub is_production: bool,
    /// Reject notifications whose signature does not match.
    pub verify_signatures: bool,
}

impl MidtransConfig {
    /// The Core API host for this account.
    #[must_use]
    pub const fn base_url(&self) -> &'static str {
        if self.is_production {
            PRODUCTION_BASE_URL
        } else {
            SANDBOX_BASE_URL
        }
    }
}

/// Midtrans Core API client.
#[derive(Debug, Clone)]
pub struct MidtransGateway {
    config: MidtransConfig,
    base_url: String,
    client: reqwest::Client,
}

impl MidtransGateway {
    /// Creates a client for the host selected by `config`.
    #[must_use]
    pub fn new(config: MidtransConfig) -> Self {
        let base_url = config.base_url().to_string();
        Self::with_base_url(config, base_url)
    }

    /// Creates a client against an explicit host.
    #[must_use]
    pub fn with_base_url(config: MidtransConfig, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config,
            base_url: base_url.into(),
            client,
        }
    }

    fn charge_url(&self) -> String {
        format!("{}/v2/charge", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PaymentGateway for MidtransGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, GatewayError> {
        debug!(
            reference = %request.reference,
            channel = request.channel.as_str(),
            amount = request.amount,
            "Submitting charge"
        );
        let response = self
            .client
            .post(self.charge_url())
            .basic_auth(&self.config.server_key, Some(""))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&ChargeBody::from(request))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("charge request failed: {e}")))?;

        let http_status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("reading charge response failed: {e}")))?;

        let reply = match serde_json::from_str::<ChargeReply>(&text) {
            Ok(reply) => reply,
            Err(_) if !http_status.is_success() => {
                return Err(GatewayError::Rejected {
                    status_code: http_status.as_u16().to_string(),
                    message: text,
                });
            }
            Err(e) => {
                return Err(GatewayError::InvalidResponse(format!(
                    "charge response is not valid JSON: {e}"
                )));
            }
        };
        reply.into_response()
    }

    fn verify_notification(&self, notification: &GatewayNotification) -> bool {
        if !self.config.verify_signatures {
            return true;
        }
        let (Some(status_code), Some(gross_amount), Some(received)) = (
            notification.status_code.as_deref(),
            notification.gross_amount.as_deref(),
            notification.signature_key.as_deref(),
        ) else {
            warn!(reference = %notification.order_id, "Notification is missing signature fields");
            return false;
        };
        let expected = notification_signature(
            &notification.order_id,
            status_code,
            gross_amount,
            &self.config.server_key,
        );
        signature_matches(&expected, received)
    }
}
