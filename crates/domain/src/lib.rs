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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod cancellation;
mod error;
mod listing;
mod order;
mod order_status;
mod payment;
mod pricing;
mod schedule;
mod time_of_day;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use cancellation::{
    CANCELLATION_FEE_PERCENT, CANCELLATION_FEE_WINDOW_HOURS, compute_cancellation_fee,
};
pub use error::DomainError;
pub use listing::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, OrderSort, PageRequest, SortDirection};
pub use order::{
    LifecycleTimestamps, Order, PriceBreakdown, authorize_cancellation,
    authorize_status_change, generate_order_number,
};
pub use order_status::{LifecycleStamp, OrderStatus};
pub use payment::{
    Payment, PaymentChannel, PaymentMethod, PaymentMethodType, PaymentStatus,
    generate_payment_reference,
};
pub use pricing::{
    DEFAULT_PLATFORM_FEE, PRICE_TOLERANCE, PriceQuote, TAX_RATE_PERCENT, ValidatedPrice,
    round_percent, validate_total,
};
pub use schedule::{BookingRejection, DayOfWeek, WeeklyScheduleEntry, check_bookable};
pub use time_of_day::TimeOfDay;
pub use types::{Address, CleanerProfile, CustomerContact, Requester, ServiceOffering, UserType};
pub use validation::{
    MAX_NOTE_LENGTH, MAX_SERVICE_ADDRESS_LENGTH, MAX_SPECIAL_INSTRUCTIONS_LENGTH,
    validate_non_negative, validate_note, validate_service_address, validate_service_date,
    validate_special_instructions, validate_time_window,
};
