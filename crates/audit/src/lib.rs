// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use clean_aceh_domain::{OrderStatus, UserType};
use time::OffsetDateTime;
use uuid::Uuid;

/// Represents the entity performing an action.
///
/// An actor is either an authenticated user or a named system process
/// such as the payment webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The acting user, absent for system actors.
    pub user_id: Option<Uuid>,
    /// The type of actor (e.g., "customer", "admin", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates an actor for an authenticated user.
    #[must_use]
    pub fn user(user_id: Uuid, user_type: UserType) -> Self {
        Self {
            user_id: Some(user_id),
            actor_type: user_type.as_str().to_string(),
        }
    }

    /// Creates an actor for an automated process.
    #[must_use]
    pub fn system(name: &str) -> Self {
        Self {
            user_id: None,
            actor_type: format!("system:{name}"),
        }
    }

    /// Returns true if this actor is not a user.
    #[must_use]
    pub const fn is_system(&self) -> bool {
        self.user_id.is_none()
    }
}

/// One row of an order's append-only status history.
///
/// Every successful status change produces exactly one entry, and order
/// creation produces one with no previous status. Entries are never
/// updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusHistoryEntry {
    /// Entry id.
    pub id: Uuid,
    /// The order this entry belongs to.
    pub order_id: Uuid,
    /// Status before the change; `None` for the creation entry.
    pub old_status: Option<OrderStatus>,
    /// Status after the change.
    pub new_status: OrderStatus,
    /// Who made the change.
    pub actor: Actor,
    /// Free-text note, including any disclosed cancellation fee.
    pub note: Option<String>,
    /// When the change was recorded.
    pub recorded_at: OffsetDateTime,
}

impl StatusHistoryEntry {
    /// Records a status transition.
    #[must_use]
    pub fn transition(
        order_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
        actor: Actor,
        note: Option<String>,
        recorded_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            old_status: Some(old_status),
            new_status,
            actor,
            note,
            recorded_at,
        }
    }

    /// Records the creation of an order.
    #[must_use]
    pub fn creation(order_id: Uuid, actor: Actor, recorded_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            old_status: None,
            new_status: OrderStatus::Pending,
            actor,
            note: Some(String::from("Order created")),
            recorded_at,
        }
    }
}
