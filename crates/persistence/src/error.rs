// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clean_aceh::StoreError;

/// `PostgreSQL` error code for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The request never produced a response.
    RequestFailed(String),
    /// The server answered with a non-success status.
    QueryFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },
    /// A unique constraint rejected the write.
    Conflict {
        /// The table written to.
        table: &'static str,
        /// Error message from the response body.
        message: String,
    },
    /// A row could not be mapped to a domain value.
    InvalidRow {
        /// The table read from.
        table: &'static str,
        /// Description of the bad data.
        message: String,
    },
    /// Serialization/deserialization error.
    SerializationError(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed(msg) => write!(f, "Request failed: {msg}"),
            Self::QueryFailed { status, message } => {
                write!(f, "Query failed with status {status}: {message}")
            }
            Self::Conflict { table, message } => {
                write!(f, "Unique constraint violated on {table}: {message}")
            }
            Self::InvalidRow { table, message } => {
                write!(f, "Invalid row in {table}: {message}")
            }
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<reqwest::Error> for PersistenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::SerializationError(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Conflict { table, message } => Self::Conflict {
                resource: table,
                message,
            },
            PersistenceError::InvalidRow { table, message } => Self::Corrupt {
                resource: table,
                message,
            },
            other => Self::Unavailable(other.to_string()),
        }
    }
}
