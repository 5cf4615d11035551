// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// The kind of account making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Books and pays for cleaning jobs.
    Customer,
    /// Performs cleaning jobs.
    Cleaner,
    /// Platform operator.
    Admin,
}

impl UserType {
    /// Returns the string representation used by the store and tokens.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Cleaner => "cleaner",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for UserType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "cleaner" => Ok(Self::Cleaner),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidUserType(s.to_string())),
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    /// The user's account id.
    pub user_id: Uuid,
    /// The user's account kind.
    pub user_type: UserType,
}

impl Requester {
    /// Creates a new requester.
    #[must_use]
    pub const fn new(user_id: Uuid, user_type: UserType) -> Self {
        Self { user_id, user_type }
    }
}

/// A cleaner's public profile, as far as booking is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanerProfile {
    /// Profile id referenced by orders.
    pub id: Uuid,
    /// The cleaner's user account.
    pub user_id: Uuid,
    /// Display name.
    pub full_name: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Whether the cleaner currently accepts orders.
    pub is_available: bool,
    /// Whether the cleaner's user account is active.
    pub account_active: bool,
}

/// A bookable service from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOffering {
    /// Service id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Description shown to customers.
    pub description: Option<String>,
    /// Whether the service can be booked.
    pub is_active: bool,
}

/// A saved customer address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Address id.
    pub id: Uuid,
    /// Owning customer.
    pub user_id: Uuid,
    /// Short label such as "Home".
    pub label: Option<String>,
    /// Street address.
    pub full_address: String,
    /// City.
    pub city: Option<String>,
}

/// Customer details forwarded to the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    /// The customer's user id.
    pub user_id: Uuid,
    /// Full name.
    pub full_name: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}
