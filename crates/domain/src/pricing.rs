// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order price recomputation.
//!
//! All amounts are integer minor currency units. The client submits the
//! total it displayed to the customer; the server recomputes it and
//! accepts small rounding differences only.

use crate::error::DomainError;

/// VAT applied to the base price plus add-ons.
pub const TAX_RATE_PERCENT: i64 = 11;

/// Largest accepted difference between the claimed and computed totals.
pub const PRICE_TOLERANCE: i64 = 100;

/// Platform fee applied when the client does not send one.
pub const DEFAULT_PLATFORM_FEE: i64 = 10_000;

/// The price components submitted with a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// Service base price.
    pub base_price: i64,
    /// Sum of the selected add-on services.
    pub add_ons_price: i64,
    /// Platform fee.
    pub platform_fee: i64,
    /// Tax amount, if the client computed one.
    pub claimed_tax: Option<i64>,
    /// Total shown to the customer.
    pub claimed_total: i64,
}

/// The result of a successful price check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedPrice {
    /// Tax used for the total (client-supplied or computed).
    pub tax: i64,
    /// Server-side total.
    pub computed_total: i64,
}

/// Returns `percent`% of `amount`, rounded half away from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn round_percent(amount: i64, percent: i64) -> i64 {
    let scaled = amount as i128 * percent as i128;
    let rounded = if scaled >= 0 {
        (scaled + 50) / 100
    } else {
        (scaled - 50) / 100
    };
    rounded as i64
}

/// Recomputes tax and total and checks the client's total against them.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` for negative components and
/// `DomainError::PriceMismatch` when the claimed total differs from the
/// computed total by more than [`PRICE_TOLERANCE`].
pub fn validate_total(quote: &PriceQuote) -> Result<ValidatedPrice, DomainError> {
    let components = [
        ("basePrice", Some(quote.base_price)),
        ("additionalServicesPrice", Some(quote.add_ons_price)),
        ("platformFee", Some(quote.platform_fee)),
        ("taxAmount", quote.claimed_tax),
        ("totalPrice", Some(quote.claimed_total)),
    ];
    for (field, value) in components {
        if let Some(v) = value {
            crate::validation::validate_non_negative(field, v)?;
        }
    }

    let taxable = quote.base_price.saturating_add(quote.add_ons_price);
    let tax = quote
        .claimed_tax
        .unwrap_or_else(|| round_percent(taxable, TAX_RATE_PERCENT));
    let computed_total = taxable
        .saturating_add(quote.platform_fee)
        .saturating_add(tax);

    if (quote.claimed_total - computed_total).abs() > PRICE_TOLERANCE {
        return Err(DomainError::PriceMismatch {
            claimed: quote.claimed_total,
            computed: computed_total,
        });
    }

    Ok(ValidatedPrice {
        tax,
        computed_total,
    })
}
