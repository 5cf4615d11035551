// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order status tracking and transition logic.
//!
//! The transition table in [`OrderStatus::allowed_targets`] is the only
//! place that decides which status changes are legal. Every caller
//! (status updates, cancellations, payment cascades) goes through it.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle states of a cleaning order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created by the customer, awaiting the cleaner.
    Pending,
    /// Accepted by the cleaner (or confirmed by payment).
    Confirmed,
    /// The cleaner is travelling to the address.
    OnTheWay,
    /// Cleaning has started.
    InProgress,
    /// Job finished.
    Completed,
    /// Job cancelled before completion.
    Cancelled,
}

/// The lifecycle timestamp stamped when an order reaches a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStamp {
    /// `confirmed_at`
    Confirmed,
    /// `started_at`
    Started,
    /// `completed_at`
    Completed,
    /// `cancelled_at`
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::OnTheWay,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Statuses that hold the cleaner's day.
    pub const ACTIVE: [Self; 4] = [
        Self::Pending,
        Self::Confirmed,
        Self::OnTheWay,
        Self::InProgress,
    ];

    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::OnTheWay => "on_the_way",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "on_the_way" => Ok(Self::OnTheWay),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidOrderStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Statuses reachable from this one in a single step.
    #[must_use]
    pub const fn allowed_targets(&self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::OnTheWay, Self::Cancelled],
            Self::OnTheWay => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Returns true if this status has no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Returns true if an order in this status blocks the cleaner's day.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the transition table contains `self -> target`.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the pair is not in
    /// the transition table.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// The timestamp stamped on arrival in this status, if any.
    #[must_use]
    pub const fn lifecycle_stamp(&self) -> Option<LifecycleStamp> {
        match self {
            Self::Confirmed => Some(LifecycleStamp::Confirmed),
            Self::InProgress => Some(LifecycleStamp::Started),
            Self::Completed => Some(LifecycleStamp::Completed),
            Self::Cancelled => Some(LifecycleStamp::Cancelled),
            Self::Pending | Self::OnTheWay => None,
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
