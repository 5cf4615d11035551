// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the CleanAceh marketplace.
//!
//! Orders, payments and their reference data live in a Supabase project
//! and are reached through its `PostgREST` endpoint. [`SupabaseStore`]
//! implements every storage and side-effect port the lifecycle manager
//! needs.
//!
//! ## Schema guards
//!
//! The uniqueness rules the lifecycle relies on are enforced by the
//! database, not by read-then-write checks in this crate:
//!
//! - one active order per cleaner and service date
//! - one pending or paid payment per order
//! - one schedule row per cleaner and weekday
//!
//! They are partial unique indexes defined in `migrations/`. A violation
//! comes back as `23505` and surfaces as [`clean_aceh::StoreError::Conflict`].

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

mod client;
mod error;
mod rows;
mod store;

#[cfg(test)]
mod tests;

pub use client::{PostgrestClient, Query};
pub use error::{PersistenceError, UNIQUE_VIOLATION};
pub use store::SupabaseStore;
