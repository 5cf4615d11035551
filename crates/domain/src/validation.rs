// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::time_of_day::TimeOfDay;
use time::Date;

/// Longest accepted service address.
pub const MAX_SERVICE_ADDRESS_LENGTH: usize = 500;

/// Longest accepted special instructions text.
pub const MAX_SPECIAL_INSTRUCTIONS_LENGTH: usize = 1000;

/// Longest accepted status note or cancellation reason.
pub const MAX_NOTE_LENGTH: usize = 500;

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::InvalidInput {
            field,
            message: format!("must be at most {max} characters, got {len}"),
        });
    }
    Ok(())
}

/// Validates a price component.
///
/// # Errors
///
/// Returns an error if `value` is negative.
pub fn validate_non_negative(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value < 0 {
        return Err(DomainError::InvalidInput {
            field,
            message: format!("must not be negative, got {value}"),
        });
    }
    Ok(())
}

/// Validates the free-text service address.
///
/// # Errors
///
/// Returns an error if the address is blank or too long.
pub fn validate_service_address(address: &str) -> Result<(), DomainError> {
    if address.trim().is_empty() {
        return Err(DomainError::InvalidInput {
            field: "serviceAddress",
            message: String::from("is required"),
        });
    }
    check_length("serviceAddress", address, MAX_SERVICE_ADDRESS_LENGTH)
}

/// Validates special instructions for the cleaner.
///
/// # Errors
///
/// Returns an error if the text is too long.
pub fn validate_special_instructions(text: &str) -> Result<(), DomainError> {
    check_length("specialInstructions", text, MAX_SPECIAL_INSTRUCTIONS_LENGTH)
}

/// Validates a status note or cancellation reason.
///
/// # Errors
///
/// Returns an error if the text is too long.
pub fn validate_note(field: &'static str, text: &str) -> Result<(), DomainError> {
    check_length(field, text, MAX_NOTE_LENGTH)
}

/// Rejects service dates before `today`. Today itself is allowed.
///
/// # Errors
///
/// Returns `DomainError::PastServiceDate` if `service_date` is in the past.
pub fn validate_service_date(service_date: Date, today: Date) -> Result<(), DomainError> {
    if service_date < today {
        return Err(DomainError::PastServiceDate {
            service_date,
            today,
        });
    }
    Ok(())
}

/// Checks that an optional end time comes after the start time.
///
/// # Errors
///
/// Returns an error if `end` is not strictly later than `start`.
pub fn validate_time_window(start: TimeOfDay, end: Option<TimeOfDay>) -> Result<(), DomainError> {
    match end {
        Some(end) if end <= start => Err(DomainError::InvalidInput {
            field: "endTime",
            message: format!("must be after start time {start}, got {end}"),
        }),
        _ => Ok(()),
    }
}
