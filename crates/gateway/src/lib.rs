// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Midtrans Core API client.
//!
//! [`MidtransGateway`] submits charges to `/v2/charge` and checks the
//! signature on payment notifications.

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
#![allow(clippy::multiple_crate_versions)]

mod midtrans;
mod signature;
mod wire;

#[cfg(test)]
mod tests;

pub use midtrans::{MidtransConfig, MidtransGateway, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
pub use signature::{notification_signature, signature_matches};
