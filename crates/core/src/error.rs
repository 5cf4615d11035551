// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::gateway::GatewayError;
use crate::store::StoreError;
use clean_aceh_domain::DomainError;

/// Errors that can occur during lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// A referenced entity does not exist (or is not visible to the requester).
    NotFound {
        /// The kind of entity.
        resource: &'static str,
        /// The identifier that was looked up.
        id: String,
    },
    /// A uniqueness rule in the store rejected the write.
    Conflict {
        /// The kind of entity.
        resource: &'static str,
        /// Description of the conflict.
        message: String,
    },
    /// The entity changed state while the request was being processed.
    ConcurrentModification {
        /// The kind of entity.
        resource: &'static str,
        /// The state the request was based on.
        expected: String,
        /// The state found when writing.
        actual: String,
    },
    /// The gateway notification failed signature verification.
    InvalidSignature,
    /// The payment gateway failed.
    Gateway(GatewayError),
    /// The store failed.
    Store(StoreError),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::NotFound { resource, id } => write!(f, "{resource} '{id}' not found"),
            Self::Conflict { resource, message } => write!(f, "{resource} conflict: {message}"),
            Self::ConcurrentModification {
                resource,
                expected,
                actual,
            } => write!(
                f,
                "{resource} changed concurrently: expected {expected}, found {actual}"
            ),
            Self::InvalidSignature => write!(f, "Notification signature is invalid"),
            Self::Gateway(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { resource, message } => Self::Conflict { resource, message },
            other => Self::Store(other),
        }
    }
}

impl From<GatewayError> for CoreError {
    fn from(err: GatewayError) -> Self {
        Self::Gateway(err)
    }
}

impl CoreError {
    pub(crate) fn not_found(resource: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}
