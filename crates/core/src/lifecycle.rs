// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The order lifecycle manager.

use crate::apply::apply_transition;
use crate::command::{CancelOrder, ChangeStatus, CreateOrder, ListOrders};
use crate::error::CoreError;
use crate::notify::{CleanerStats, Notification, NotificationKind, NotificationSink, send_quietly};
use crate::state::{CancellationResult, OrderDetails, OrderStats, TransitionResult};
use crate::store::{CasOutcome, OrderScope, OrderStore, Page, PaymentStore};
use clean_aceh_audit::{Actor, StatusHistoryEntry};
use clean_aceh_domain::{
    CleanerProfile, DEFAULT_PLATFORM_FEE, DayOfWeek, DomainError, LifecycleTimestamps, Order,
    OrderStatus, PageRequest, PriceBreakdown, PriceQuote, Requester, UserType, ValidatedPrice,
    authorize_cancellation, authorize_status_change, check_bookable, generate_order_number,
    validate_note, validate_service_address, validate_service_date,
    validate_special_instructions, validate_time_window, validate_total,
};
use std::sync::Arc;
use time::macros::offset;
use time::{OffsetDateTime, UtcOffset};
use tracing::{error, info, warn};
use uuid::Uuid;

/// How many orders the dashboard statistics list.
const RECENT_ORDER_COUNT: u32 = 5;

/// Deployment-specific lifecycle settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Offset in which service dates and times are interpreted.
    pub service_offset: UtcOffset,
    /// Platform fee used when a request omits one.
    pub default_platform_fee: i64,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            service_offset: offset!(+7),
            default_platform_fee: DEFAULT_PLATFORM_FEE,
        }
    }
}

/// Who started a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Initiator {
    User(Requester),
    System(&'static str),
}

impl Initiator {
    fn actor(self) -> Actor {
        match self {
            Self::User(requester) => Actor::user(requester.user_id, requester.user_type),
            Self::System(name) => Actor::system(name),
        }
    }
}

/// Notification text for the other parties of a transition.
struct Announcement {
    title: &'static str,
    message: String,
}

/// Creates orders and drives them through their status lifecycle.
#[derive(Clone)]
pub struct OrderLifecycle {
    pub(crate) orders: Arc<dyn OrderStore>,
    pub(crate) payments: Arc<dyn PaymentStore>,
    notifications: Arc<dyn NotificationSink>,
    stats: Arc<dyn CleanerStats>,
    policy: LifecyclePolicy,
}

impl OrderLifecycle {
    /// Creates a new lifecycle manager over the given collaborators.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderStore>,
        payments: Arc<dyn PaymentStore>,
        notifications: Arc<dyn NotificationSink>,
        stats: Arc<dyn CleanerStats>,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            orders,
            payments,
            notifications,
            stats,
            policy,
        }
    }

    /// The active policy.
    #[must_use]
    pub const fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    pub(crate) fn notifications(&self) -> &dyn NotificationSink {
        self.notifications.as_ref()
    }

    /// Books a cleaner for a customer.
    ///
    /// The booking is gated, in order, by input validation, the service
    /// date, the cleaner and service records, the customer's address, the
    /// cleaner's schedule and existing orders, and the price check. The
    /// new order starts in `pending` with one creation history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if any gate fails, or if a concurrent booking took
    /// the cleaner's day between the check and the insert.
    pub async fn create_order(
        &self,
        requester: &Requester,
        command: CreateOrder,
        now: OffsetDateTime,
    ) -> Result<Order, CoreError> {
        if requester.user_type != UserType::Customer {
            return Err(DomainError::Forbidden {
                action: "create_order",
                reason: String::from("only customers can book cleaners"),
            }
            .into());
        }

        validate_service_address(&command.service_address)?;
        if let Some(text) = &command.special_instructions {
            validate_special_instructions(text)?;
        }
        validate_time_window(command.start_time, command.end_time)?;

        let today = now.to_offset(self.policy.service_offset).date();
        validate_service_date(command.service_date, today)?;

        let cleaner = self
            .orders
            .find_cleaner(command.cleaner_id)
            .await?
            .ok_or_else(|| CoreError::not_found("cleaner", command.cleaner_id))?;
        if !cleaner.account_active {
            return Err(DomainError::CleanerInactive {
                cleaner_id: cleaner.id,
            }
            .into());
        }
        if !cleaner.is_available {
            return Err(DomainError::CleanerUnavailable {
                cleaner_id: cleaner.id,
            }
            .into());
        }

        let service = self
            .orders
            .find_service(command.service_id)
            .await?
            .ok_or_else(|| CoreError::not_found("service", command.service_id))?;
        if !service.is_active {
            return Err(DomainError::ServiceInactive {
                service_id: service.id,
            }
            .into());
        }

        if let Some(address_id) = command.address_id {
            self.orders
                .find_address(address_id, requester.user_id)
                .await?
                .ok_or_else(|| CoreError::not_found("address", address_id))?;
        }

        let day = DayOfWeek::of(command.service_date);
        let schedule = self.orders.find_schedule(cleaner.id, day).await?;
        let existing = self
            .orders
            .list_active_orders(cleaner.id, command.service_date)
            .await?;
        check_bookable(
            cleaner.id,
            command.service_date,
            command.start_time,
            schedule.as_ref(),
            &existing,
        )
        .map_err(DomainError::NotBookable)?;

        let platform_fee = command
            .platform_fee
            .unwrap_or(self.policy.default_platform_fee);
        let quote = PriceQuote {
            base_price: command.base_price,
            add_ons_price: command.add_ons_price,
            platform_fee,
            claimed_tax: command.tax_amount,
            claimed_total: command.total_price,
        };
        let validated: ValidatedPrice = validate_total(&quote)?;

        let order = Order {
            id: Uuid::new_v4(),
            order_number: generate_order_number(now, rand::random::<u16>()),
            customer_id: requester.user_id,
            cleaner_id: cleaner.id,
            service_id: service.id,
            address_id: command.address_id,
            service_address: command.service_address,
            status: OrderStatus::Pending,
            service_date: command.service_date,
            start_time: command.start_time,
            end_time: command.end_time,
            pricing: PriceBreakdown {
                base_price: command.base_price,
                add_ons_price: command.add_ons_price,
                platform_fee,
                tax_amount: validated.tax,
                total_price: command.total_price,
            },
            additional_services: command.additional_services,
            special_instructions: command.special_instructions,
            timestamps: LifecycleTimestamps::created(now),
            updated_at: now,
        };

        self.orders.insert_order(&order).await?;
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            cleaner_id = %order.cleaner_id,
            service_date = %order.service_date,
            total_price = order.pricing.total_price,
            "Order created"
        );

        let entry = StatusHistoryEntry::creation(
            order.id,
            Actor::user(requester.user_id, requester.user_type),
            now,
        );
        self.record_history(&entry).await;

        send_quietly(
            self.notifications(),
            Notification {
                user_id: cleaner.user_id,
                title: String::from("New order"),
                message: format!(
                    "You have a new order for {} on {}",
                    service.name, order.service_date
                ),
                kind: NotificationKind::Order,
                related_id: Some(order.id),
            },
        )
        .await;

        Ok(order)
    }

    /// Moves an order to another status on behalf of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist, the requester lacks
    /// authority, the transition is not allowed, or the order changed
    /// concurrently.
    pub async fn update_order_status(
        &self,
        requester: &Requester,
        command: ChangeStatus,
        now: OffsetDateTime,
    ) -> Result<TransitionResult, CoreError> {
        if let Some(note) = &command.note {
            validate_note("notes", note)?;
        }

        let order = self.load_order(command.order_id).await?;
        let cleaner = self.load_cleaner(&order).await?;
        authorize_status_change(requester, &order, cleaner.user_id, command.target)?;

        let mut note = command.note;
        if command.target == OrderStatus::Cancelled {
            let fee = order.cancellation_fee(now, self.policy.service_offset);
            if fee > 0 {
                let base = note.unwrap_or_else(|| String::from("Order cancelled"));
                note = Some(format!("{base} (cancellation fee: {fee})"));
            }
        }

        let announcement = Announcement {
            title: "Order status updated",
            message: format!(
                "Order #{} is now {}",
                order.order_number, command.target
            ),
        };
        self.commit_transition(
            &order,
            &cleaner,
            command.target,
            Initiator::User(*requester),
            note,
            announcement,
            now,
        )
        .await
    }

    /// Cancels an order, disclosing any late-cancellation fee.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist, the requester is not a
    /// party to it, the order cannot be cancelled by this requester in its
    /// current status, or the order changed concurrently.
    pub async fn cancel_order(
        &self,
        requester: &Requester,
        command: CancelOrder,
        now: OffsetDateTime,
    ) -> Result<CancellationResult, CoreError> {
        if let Some(reason) = &command.reason {
            validate_note("reason", reason)?;
        }

        let order = self.load_order(command.order_id).await?;
        let cleaner = self.load_cleaner(&order).await?;
        authorize_cancellation(requester, &order, cleaner.user_id)?;

        let fee = order.cancellation_fee(now, self.policy.service_offset);
        let reason = command
            .reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| String::from("Order cancelled"));
        let note = if fee > 0 {
            format!("{reason} (cancellation fee: {fee})")
        } else {
            reason.clone()
        };

        let announcement = Announcement {
            title: "Order cancelled",
            message: format!("Order #{} has been cancelled", order.order_number),
        };
        let result = self
            .commit_transition(
                &order,
                &cleaner,
                OrderStatus::Cancelled,
                Initiator::User(*requester),
                Some(note),
                announcement,
                now,
            )
            .await?;

        Ok(CancellationResult {
            order: result.order,
            cancellation_fee: fee,
            reason,
        })
    }

    /// Returns an order with its history and payments.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the requester is
    /// neither an admin nor a party to it.
    pub async fn get_order(
        &self,
        requester: &Requester,
        order_id: Uuid,
    ) -> Result<OrderDetails, CoreError> {
        let order = self.load_order(order_id).await?;
        let visible = match requester.user_type {
            UserType::Admin => true,
            UserType::Customer => order.customer_id == requester.user_id,
            UserType::Cleaner => self.load_cleaner(&order).await?.user_id == requester.user_id,
        };
        if !visible {
            return Err(DomainError::Forbidden {
                action: "view_order",
                reason: String::from("not a party to this order"),
            }
            .into());
        }

        let history = self.orders.list_history(order.id).await?;
        let payments = self.payments.list_payments(order.id).await?;
        Ok(OrderDetails {
            order,
            history,
            payments,
        })
    }

    /// Lists the orders visible to the requester.
    ///
    /// Customers see the orders they booked, cleaners the orders assigned
    /// to them and admins every order.
    ///
    /// # Errors
    ///
    /// Returns an error if a cleaner has no profile or the store fails.
    pub async fn list_orders(
        &self,
        requester: &Requester,
        query: &ListOrders,
    ) -> Result<Page<Order>, CoreError> {
        let scope = self.scope_for(requester).await?;
        let page = self.orders.list_orders(scope, query).await?;
        info!(
            user_id = %requester.user_id,
            returned = page.items.len(),
            total = page.total,
            "Listed orders"
        );
        Ok(page)
    }

    /// Counts the requester's orders by status and returns the newest few.
    ///
    /// # Errors
    ///
    /// Returns an error if a cleaner has no profile or the store fails.
    pub async fn order_stats(&self, requester: &Requester) -> Result<OrderStats, CoreError> {
        let scope = self.scope_for(requester).await?;
        let statuses = self.orders.list_order_statuses(scope).await?;
        let recent = self
            .orders
            .list_orders(
                scope,
                &ListOrders {
                    page: PageRequest::first(RECENT_ORDER_COUNT),
                    ..ListOrders::default()
                },
            )
            .await?;
        Ok(OrderStats::tally(&statuses, recent.items))
    }

    async fn scope_for(&self, requester: &Requester) -> Result<OrderScope, CoreError> {
        match requester.user_type {
            UserType::Customer => Ok(OrderScope::Customer(requester.user_id)),
            UserType::Admin => Ok(OrderScope::All),
            UserType::Cleaner => {
                let profile = self
                    .orders
                    .find_cleaner_by_user(requester.user_id)
                    .await?
                    .ok_or_else(|| CoreError::not_found("cleaner profile", requester.user_id))?;
                Ok(OrderScope::Cleaner(profile.id))
            }
        }
    }

    /// Confirms a pending order after its payment settled.
    ///
    /// Orders already past `pending` are left alone. Returns whether the
    /// order was moved.
    pub(crate) async fn confirm_paid_order(
        &self,
        order_id: Uuid,
        now: OffsetDateTime,
    ) -> Result<bool, CoreError> {
        let order = self.load_order(order_id).await?;
        match order.status {
            OrderStatus::Pending => {}
            OrderStatus::Cancelled => {
                warn!(%order_id, "Payment settled for a cancelled order");
                return Ok(false);
            }
            _ => return Ok(false),
        }

        let cleaner = self.load_cleaner(&order).await?;
        let announcement = Announcement {
            title: "Order confirmed",
            message: format!("Order #{} has been paid and confirmed", order.order_number),
        };
        let result = self
            .commit_transition(
                &order,
                &cleaner,
                OrderStatus::Confirmed,
                Initiator::System("payment_webhook"),
                Some(String::from("Payment received")),
                announcement,
                now,
            )
            .await;

        match result {
            Ok(_) => Ok(true),
            // Someone else confirmed or cancelled it in the meantime.
            Err(CoreError::ConcurrentModification { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn load_order(&self, order_id: Uuid) -> Result<Order, CoreError> {
        self.orders
            .find_order(order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("order", order_id))
    }

    async fn load_cleaner(&self, order: &Order) -> Result<CleanerProfile, CoreError> {
        self.orders
            .find_cleaner(order.cleaner_id)
            .await?
            .ok_or_else(|| CoreError::not_found("cleaner", order.cleaner_id))
    }

    async fn record_history(&self, entry: &StatusHistoryEntry) {
        if let Err(e) = self.orders.append_history(entry).await {
            error!(
                order_id = %entry.order_id,
                new_status = %entry.new_status,
                error = %e,
                "Failed to append status history"
            );
        }
    }

    /// Applies, stores and announces a transition.
    #[allow(clippy::too_many_arguments)]
    async fn commit_transition(
        &self,
        order: &Order,
        cleaner: &CleanerProfile,
        target: OrderStatus,
        initiator: Initiator,
        note: Option<String>,
        announcement: Announcement,
        now: OffsetDateTime,
    ) -> Result<TransitionResult, CoreError> {
        let result = apply_transition(order, target, initiator.actor(), note, now)?;

        let stored = match self.orders.update_order(order.status, &result.order).await? {
            CasOutcome::Applied(stored) => stored,
            CasOutcome::NotFound => return Err(CoreError::not_found("order", order.id)),
            CasOutcome::StateMismatch { actual } => {
                return Err(CoreError::ConcurrentModification {
                    resource: "order",
                    expected: order.status.to_string(),
                    actual: actual.to_string(),
                });
            }
        };

        info!(
            order_id = %stored.id,
            from = %order.status,
            to = %stored.status,
            actor = %result.history.actor.actor_type,
            "Order status changed"
        );
        self.record_history(&result.history).await;

        for user_id in counterparties(initiator, order.customer_id, cleaner.user_id) {
            send_quietly(
                self.notifications(),
                Notification {
                    user_id,
                    title: announcement.title.to_string(),
                    message: announcement.message.clone(),
                    kind: NotificationKind::Order,
                    related_id: Some(order.id),
                },
            )
            .await;
        }

        if stored.status == OrderStatus::Completed {
            if let Err(e) = self.stats.record_completed_job(stored.cleaner_id).await {
                warn!(
                    cleaner_id = %stored.cleaner_id,
                    error = %e,
                    "Failed to update cleaner stats"
                );
            }
        }

        Ok(TransitionResult {
            order: stored,
            history: result.history,
        })
    }
}

/// Who hears about a transition: the other side of the order.
fn counterparties(initiator: Initiator, customer_id: Uuid, cleaner_user_id: Uuid) -> Vec<Uuid> {
    match initiator {
        Initiator::User(requester) => match requester.user_type {
            UserType::Customer => vec![cleaner_user_id],
            UserType::Cleaner => vec![customer_id],
            UserType::Admin => vec![customer_id, cleaner_user_id],
        },
        Initiator::System(_) => vec![cleaner_user_id],
    }
}
