// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment creation and webhook reconciliation.
//!
//! Gateway notifications arrive at least once and possibly out of order.
//! Each one is reduced to a target payment status and applied with a
//! compare-and-set on the payment's current status, so a given
//! (payment, target status) pair takes effect at most once. Repeated or
//! stale notifications change nothing and fire no side effects.

use crate::command::{CreatePayment, ListPayments};
use crate::error::CoreError;
use crate::gateway::{ChargeItem, ChargeRequest, GatewayNotification, PaymentGateway};
use crate::lifecycle::OrderLifecycle;
use crate::notify::{Notification, NotificationKind, send_quietly};
use crate::state::{PaymentIntent, WebhookOutcome};
use crate::store::{CasOutcome, Page, PaymentRecord};
use clean_aceh_domain::{
    DomainError, OrderStatus, Payment, PaymentChannel, PaymentStatus, Requester,
    generate_payment_reference,
};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Creates payments with the gateway and applies its notifications.
#[derive(Clone)]
pub struct PaymentReconciler {
    lifecycle: OrderLifecycle,
    gateway: Arc<dyn PaymentGateway>,
    callback_url: Option<String>,
}

impl PaymentReconciler {
    /// Creates a reconciler.
    ///
    /// `callback_url` is where e-wallet apps return the customer after
    /// paying.
    #[must_use]
    pub fn new(
        lifecycle: OrderLifecycle,
        gateway: Arc<dyn PaymentGateway>,
        callback_url: Option<String>,
    ) -> Self {
        Self {
            lifecycle,
            gateway,
            callback_url,
        }
    }

    /// Starts paying for a confirmed order.
    ///
    /// The payment is stored as `pending` before the gateway is called.
    /// If the charge fails the payment stays `pending` without a
    /// transaction id and the gateway error is returned. Calling again
    /// re-sends the charge for that payment under the same reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the order or payment method does not exist, the
    /// requester does not own the order, the order is not `confirmed`, the
    /// order already has an active payment, or the gateway fails.
    pub async fn create_payment(
        &self,
        requester: &Requester,
        command: CreatePayment,
        now: OffsetDateTime,
    ) -> Result<PaymentIntent, CoreError> {
        let orders = &self.lifecycle.orders;
        let payments = &self.lifecycle.payments;

        let order = orders
            .find_order(command.order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("order", command.order_id))?;
        if order.customer_id != requester.user_id {
            return Err(DomainError::Forbidden {
                action: "create_payment",
                reason: String::from("only the ordering customer can pay"),
            }
            .into());
        }
        if order.status != OrderStatus::Confirmed {
            return Err(DomainError::OrderNotConfirmed {
                status: order.status,
            }
            .into());
        }

        let method = payments
            .find_payment_method(command.payment_method_id, requester.user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("payment method", command.payment_method_id))?;

        let customer = payments
            .find_customer_contact(order.customer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("customer", order.customer_id))?;

        let (mut payment, method) = match payments.find_active_payment(order.id).await? {
            Some(existing) if existing.awaiting_charge() => {
                info!(
                    payment_id = %existing.id,
                    reference = %existing.reference,
                    "Retrying charge the gateway never acknowledged"
                );
                let method = if existing.payment_method_id == method.id {
                    method
                } else {
                    payments
                        .find_payment_method(existing.payment_method_id, requester.user_id)
                        .await?
                        .ok_or_else(|| {
                            CoreError::not_found("payment method", existing.payment_method_id)
                        })?
                };
                (existing, method)
            }
            Some(existing) => {
                return Err(DomainError::PaymentAlreadyExists {
                    order_id: order.id,
                    status: existing.status,
                }
                .into());
            }
            None => {
                let payment = Payment {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    payment_method_id: method.id,
                    amount: order.pricing.total_price,
                    status: PaymentStatus::Pending,
                    reference: generate_payment_reference(&order.order_number, now),
                    transaction_id: None,
                    paid_at: None,
                    created_at: now,
                };
                payments.insert_payment(&payment).await?;
                info!(
                    payment_id = %payment.id,
                    order_id = %order.id,
                    reference = %payment.reference,
                    amount = payment.amount,
                    "Payment created"
                );
                (payment, method)
            }
        };

        let channel = method.channel();
        let request = ChargeRequest {
            reference: payment.reference.clone(),
            amount: payment.amount,
            channel,
            customer,
            items: vec![ChargeItem {
                id: order.order_number.clone(),
                name: format!("Cleaning service #{}", order.order_number),
                price: payment.amount,
                quantity: 1,
            }],
            callback_url: self
                .callback_url
                .clone()
                .filter(|_| channel == PaymentChannel::Gopay),
        };

        let charge = match self.gateway.charge(&request).await {
            Ok(charge) => charge,
            Err(e) => {
                error!(
                    payment_id = %payment.id,
                    reference = %payment.reference,
                    error = %e,
                    "Gateway charge failed; payment left pending for retry"
                );
                return Err(e.into());
            }
        };

        match payments
            .set_payment_transaction_id(payment.id, &charge.transaction_id)
            .await
        {
            Ok(()) => payment.transaction_id = Some(charge.transaction_id.clone()),
            Err(e) => error!(
                payment_id = %payment.id,
                transaction_id = %charge.transaction_id,
                error = %e,
                "Failed to store gateway transaction id"
            ),
        }

        Ok(PaymentIntent { payment, charge })
    }

    /// Applies a gateway notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is invalid, no payment matches the
    /// notification, or the store fails.
    pub async fn reconcile_webhook(
        &self,
        notification: &GatewayNotification,
        now: OffsetDateTime,
    ) -> Result<WebhookOutcome, CoreError> {
        if !self.gateway.verify_notification(notification) {
            warn!(reference = %notification.order_id, "Rejected notification with bad signature");
            return Err(CoreError::InvalidSignature);
        }

        info!(
            reference = %notification.order_id,
            transaction_status = %notification.transaction_status,
            fraud_status = ?notification.fraud_status,
            "Payment notification received"
        );

        let payments = &self.lifecycle.payments;
        let payment = payments
            .find_payment_by_reference(&notification.order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("payment", &notification.order_id))?;

        let Some(target) = PaymentStatus::from_gateway(
            &notification.transaction_status,
            notification.fraud_status.as_deref(),
        ) else {
            return Ok(WebhookOutcome::Ignored {
                transaction_status: notification.transaction_status.clone(),
            });
        };

        if payment.status == target {
            return Ok(WebhookOutcome::Unchanged { payment });
        }
        if !payment.status.can_transition_to(target) {
            warn!(
                payment_id = %payment.id,
                current = %payment.status,
                notified = %target,
                "Ignoring out-of-order payment notification"
            );
            return Ok(WebhookOutcome::Unchanged { payment });
        }

        let paid_at = (target == PaymentStatus::Paid).then_some(now);
        let updated = match payments
            .update_payment_status(payment.id, payment.status, target, paid_at)
            .await?
        {
            CasOutcome::Applied(updated) => updated,
            CasOutcome::NotFound => return Err(CoreError::not_found("payment", payment.id)),
            CasOutcome::StateMismatch { actual } => {
                // A concurrent delivery got there first.
                info!(payment_id = %payment.id, %actual, "Payment already updated");
                let mut current = payment;
                current.status = actual;
                return Ok(WebhookOutcome::Unchanged { payment: current });
            }
        };
        info!(
            payment_id = %updated.id,
            from = %payment.status,
            to = %updated.status,
            "Payment status changed"
        );

        let mut order_confirmed = false;
        if updated.status == PaymentStatus::Paid {
            order_confirmed = match self.lifecycle.confirm_paid_order(updated.order_id, now).await {
                Ok(confirmed) => confirmed,
                Err(e) => {
                    error!(
                        order_id = %updated.order_id,
                        payment_id = %updated.id,
                        error = %e,
                        "Failed to confirm order after payment"
                    );
                    false
                }
            };
            self.notify_customer(&updated).await;
        }

        Ok(WebhookOutcome::Applied {
            payment: updated,
            order_confirmed,
        })
    }

    /// The requester's payments as a customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_payments(
        &self,
        requester: &Requester,
        query: &ListPayments,
    ) -> Result<Page<PaymentRecord>, CoreError> {
        Ok(self
            .lifecycle
            .payments
            .list_customer_payments(requester.user_id, query)
            .await?)
    }

    /// Returns one of the requester's payments.
    ///
    /// Payments for orders booked by someone else are reported as missing.
    ///
    /// # Errors
    ///
    /// Returns an error if no such payment belongs to the requester or the
    /// store fails.
    pub async fn get_payment(
        &self,
        requester: &Requester,
        payment_id: Uuid,
    ) -> Result<PaymentRecord, CoreError> {
        self.lifecycle
            .payments
            .find_payment(payment_id)
            .await?
            .filter(|record| record.customer_id == requester.user_id)
            .ok_or_else(|| CoreError::not_found("payment", payment_id))
    }

    async fn notify_customer(&self, payment: &Payment) {
        let order = match self.lifecycle.orders.find_order(payment.order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => return,
            Err(e) => {
                warn!(
                    order_id = %payment.order_id,
                    error = %e,
                    "Could not load order for payment notification"
                );
                return;
            }
        };
        send_quietly(
            self.lifecycle.notifications(),
            Notification {
                user_id: order.customer_id,
                title: String::from("Payment successful"),
                message: String::from("Your payment has been confirmed"),
                kind: NotificationKind::Payment,
                related_id: Some(payment.id),
            },
        )
        .await;
    }
}
