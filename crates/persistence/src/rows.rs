// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row shapes of the Supabase tables and their mapping to domain values.
//!
//! Field names follow the column names. Dates travel as `YYYY-MM-DD`,
//! times as `HH:MM[:SS]` and timestamps as RFC 3339.

use crate::error::PersistenceError;
use clean_aceh::{Notification, PaymentRecord};
use clean_aceh_audit::{Actor, StatusHistoryEntry};
use clean_aceh_domain::{
    Address, CleanerProfile, CustomerContact, DayOfWeek, LifecycleTimestamps, Order, OrderStatus,
    Payment, PaymentMethod, PaymentMethodType, PaymentStatus, PriceBreakdown, ServiceOffering,
    TimeOfDay, WeeklyScheduleEntry,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Money columns are `numeric`, which arrives as an integer, a float, or
/// a string depending on the column definition.
mod amount {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_float<E: serde::de::Error>(value: f64) -> Result<i64, E> {
        if !value.is_finite() || value.fract().abs() > f64::EPSILON {
            return Err(E::custom(format!("{value} is not a whole amount")));
        }
        Ok(value as i64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Ok(v),
            Raw::Float(v) => from_float(v),
            Raw::Text(s) => {
                let v: f64 = s.trim().parse().map_err(serde::de::Error::custom)?;
                from_float(v)
            }
        }
    }
}

fn invalid(table: &'static str, message: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::InvalidRow {
        table,
        message: message.to_string(),
    }
}

/// `users` columns embedded into a cleaner profile.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedUser {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

/// `cleaner_profiles` joined with its user.
#[derive(Debug, Clone, Deserialize)]
pub struct CleanerRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub is_available: bool,
    pub users: Option<EmbeddedUser>,
}

impl From<CleanerRow> for CleanerProfile {
    fn from(row: CleanerRow) -> Self {
        let user = row.users;
        Self {
            id: row.id,
            user_id: row.user_id,
            full_name: user.as_ref().and_then(|u| u.full_name.clone()),
            phone: user.as_ref().and_then(|u| u.phone.clone()),
            is_available: row.is_available,
            account_active: user
                .as_ref()
                .and_then(|u| u.status.as_deref())
                .is_some_and(|s| s == "active"),
        }
    }
}

/// `services`
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl From<ServiceRow> for ServiceOffering {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
        }
    }
}

/// `user_addresses`
#[derive(Debug, Clone, Deserialize)]
pub struct AddressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: Option<String>,
    pub full_address: String,
    pub city: Option<String>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            label: row.label,
            full_address: row.full_address,
            city: row.city,
        }
    }
}

/// `cleaner_schedules`
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRow {
    pub cleaner_id: Uuid,
    pub day_of_week: u8,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub is_available: bool,
}

impl TryFrom<ScheduleRow> for WeeklyScheduleEntry {
    type Error = PersistenceError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            cleaner_id: row.cleaner_id,
            day_of_week: DayOfWeek::new(row.day_of_week)
                .map_err(|e| invalid("cleaner_schedules", e))?,
            start_time: row.start_time,
            end_time: row.end_time,
            is_available: row.is_available,
        })
    }
}

/// `users`, as needed for gateway customer details.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<UserRow> for CustomerContact {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.id,
            full_name: row.full_name.unwrap_or_default(),
            email: row.email,
            phone: row.phone,
        }
    }
}

/// `orders`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub cleaner_id: Uuid,
    pub service_id: Uuid,
    pub address_id: Option<Uuid>,
    pub service_address: String,
    pub status: OrderStatus,
    #[serde(with = "iso_date")]
    pub service_date: Date,
    pub start_time: TimeOfDay,
    pub end_time: Option<TimeOfDay>,
    #[serde(deserialize_with = "amount::deserialize")]
    pub base_price: i64,
    #[serde(deserialize_with = "amount::deserialize")]
    pub additional_services_price: i64,
    #[serde(deserialize_with = "amount::deserialize")]
    pub platform_fee: i64,
    #[serde(deserialize_with = "amount::deserialize")]
    pub tax_amount: i64,
    #[serde(deserialize_with = "amount::deserialize")]
    pub total_price: i64,
    #[serde(default)]
    pub additional_services: Vec<String>,
    pub special_instructions: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub confirmed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub cancelled_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            customer_id: order.customer_id,
            cleaner_id: order.cleaner_id,
            service_id: order.service_id,
            address_id: order.address_id,
            service_address: order.service_address.clone(),
            status: order.status,
            service_date: order.service_date,
            start_time: order.start_time,
            end_time: order.end_time,
            base_price: order.pricing.base_price,
            additional_services_price: order.pricing.add_ons_price,
            platform_fee: order.pricing.platform_fee,
            tax_amount: order.pricing.tax_amount,
            total_price: order.pricing.total_price,
            additional_services: order.additional_services.clone(),
            special_instructions: order.special_instructions.clone(),
            created_at: order.timestamps.created_at,
            confirmed_at: order.timestamps.confirmed_at,
            started_at: order.timestamps.started_at,
            completed_at: order.timestamps.completed_at,
            cancelled_at: order.timestamps.cancelled_at,
            updated_at: order.updated_at,
        }
    }
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_number: row.order_number,
            customer_id: row.customer_id,
            cleaner_id: row.cleaner_id,
            service_id: row.service_id,
            address_id: row.address_id,
            service_address: row.service_address,
            status: row.status,
            service_date: row.service_date,
            start_time: row.start_time,
            end_time: row.end_time,
            pricing: PriceBreakdown {
                base_price: row.base_price,
                add_ons_price: row.additional_services_price,
                platform_fee: row.platform_fee,
                tax_amount: row.tax_amount,
                total_price: row.total_price,
            },
            additional_services: row.additional_services,
            special_instructions: row.special_instructions,
            timestamps: LifecycleTimestamps {
                created_at: row.created_at,
                confirmed_at: row.confirmed_at,
                started_at: row.started_at,
                completed_at: row.completed_at,
                cancelled_at: row.cancelled_at,
            },
            updated_at: row.updated_at,
        }
    }
}

/// The columns a status change touches.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusPatch {
    pub status: OrderStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub confirmed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub cancelled_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&Order> for OrderStatusPatch {
    fn from(order: &Order) -> Self {
        Self {
            status: order.status,
            confirmed_at: order.timestamps.confirmed_at,
            started_at: order.timestamps.started_at,
            completed_at: order.timestamps.completed_at,
            cancelled_at: order.timestamps.cancelled_at,
            updated_at: order.updated_at,
        }
    }
}

/// `order_status_history`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub old_status: Option<OrderStatus>,
    pub new_status: OrderStatus,
    pub changed_by: Option<Uuid>,
    pub actor_type: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&StatusHistoryEntry> for HistoryRow {
    fn from(entry: &StatusHistoryEntry) -> Self {
        Self {
            id: entry.id,
            order_id: entry.order_id,
            old_status: entry.old_status,
            new_status: entry.new_status,
            changed_by: entry.actor.user_id,
            actor_type: entry.actor.actor_type.clone(),
            notes: entry.note.clone(),
            created_at: entry.recorded_at,
        }
    }
}

impl From<HistoryRow> for StatusHistoryEntry {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            old_status: row.old_status,
            new_status: row.new_status,
            actor: Actor {
                user_id: row.changed_by,
                actor_type: row.actor_type,
            },
            note: row.notes,
            recorded_at: row.created_at,
        }
    }
}

/// `payments`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub payment_method_id: Uuid,
    #[serde(deserialize_with = "amount::deserialize")]
    pub amount: i64,
    pub status: PaymentStatus,
    pub payment_reference: String,
    pub gateway_transaction_id: Option<String>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub paid_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&Payment> for PaymentRow {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            order_id: payment.order_id,
            payment_method_id: payment.payment_method_id,
            amount: payment.amount,
            status: payment.status,
            payment_reference: payment.reference.clone(),
            gateway_transaction_id: payment.transaction_id.clone(),
            paid_at: payment.paid_at,
            created_at: payment.created_at,
        }
    }
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            payment_method_id: row.payment_method_id,
            amount: row.amount,
            status: row.status,
            reference: row.payment_reference,
            transaction_id: row.gateway_transaction_id,
            paid_at: row.paid_at,
            created_at: row.created_at,
        }
    }
}

/// `orders` columns embedded into a payment.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedOrder {
    pub order_number: String,
    #[serde(with = "iso_date")]
    pub service_date: Date,
    pub customer_id: Uuid,
}

/// `payments` joined with the order it pays for.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRecordRow {
    #[serde(flatten)]
    pub payment: PaymentRow,
    pub orders: EmbeddedOrder,
}

impl From<PaymentRecordRow> for PaymentRecord {
    fn from(row: PaymentRecordRow) -> Self {
        Self {
            payment: Payment::from(row.payment),
            order_number: row.orders.order_number,
            service_date: row.orders.service_date,
            customer_id: row.orders.customer_id,
        }
    }
}

/// `orders`, status column only.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrderStatusRow {
    pub status: OrderStatus,
}

/// The columns a payment status change touches. `paid_at` is left alone
/// unless set.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentStatusPatch {
    pub status: PaymentStatus,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub paid_at: Option<OffsetDateTime>,
}

/// `payment_methods`
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodRow {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub method_type: String,
    pub provider: String,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    pub is_active: bool,
}

impl TryFrom<PaymentMethodRow> for PaymentMethod {
    type Error = PersistenceError;

    fn try_from(row: PaymentMethodRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            method_type: row
                .method_type
                .parse::<PaymentMethodType>()
                .map_err(|e| invalid("payment_methods", e))?,
            provider: row.provider,
            account_number: row.account_number.unwrap_or_default(),
            account_name: row.account_name.unwrap_or_default(),
            is_active: row.is_active,
        })
    }
}

/// `notifications`
#[derive(Debug, Clone, Serialize)]
pub struct NotificationRow {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub related_id: Option<Uuid>,
}

impl From<Notification> for NotificationRow {
    fn from(n: Notification) -> Self {
        Self {
            user_id: n.user_id,
            title: n.title,
            message: n.message,
            kind: n.kind.as_str(),
            related_id: n.related_id,
        }
    }
}

/// Arguments of the `increment_cleaner_stats` procedure.
#[derive(Debug, Clone, Serialize)]
pub struct CleanerStatsArgs {
    pub cleaner_id: Uuid,
}
