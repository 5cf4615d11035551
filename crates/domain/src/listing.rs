// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Paging and sorting of list queries.

use crate::error::DomainError;
use std::str::FromStr;

/// Page size used when a request does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: u32 = 50;

/// A 1-based page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Creates a page request.
    ///
    /// # Errors
    ///
    /// Returns an error if `page` is zero or `limit` is outside
    /// `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, limit: u32) -> Result<Self, DomainError> {
        if page == 0 {
            return Err(DomainError::InvalidInput {
                field: "page",
                message: String::from("must be at least 1"),
            });
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(DomainError::InvalidInput {
                field: "limit",
                message: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }
        Ok(Self { page, limit })
    }

    /// The first page, holding at most `limit` rows (clamped to the
    /// allowed range).
    #[must_use]
    pub const fn first(limit: u32) -> Self {
        let limit = if limit == 0 {
            1
        } else if limit > MAX_PAGE_SIZE {
            MAX_PAGE_SIZE
        } else {
            limit
        };
        Self { page: 1, limit }
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows skipped before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Number of pages needed for `total` rows.
    #[must_use]
    pub const fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }

    /// Whether rows remain after this page.
    #[must_use]
    pub const fn has_next(&self, total: u64) -> bool {
        (self.page as u64) < self.total_pages(total)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Column an order listing is sorted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrderSort {
    /// Booking time.
    #[default]
    CreatedAt,
    /// Service date.
    ServiceDate,
    /// Order total.
    TotalPrice,
}

impl OrderSort {
    /// The column name in the store.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::ServiceDate => "service_date",
            Self::TotalPrice => "total_price",
        }
    }
}

impl FromStr for OrderSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "service_date" => Ok(Self::ServiceDate),
            "total_price" => Ok(Self::TotalPrice),
            _ => Err(DomainError::InvalidInput {
                field: "sortBy",
                message: format!("'{s}' is not one of created_at, service_date, total_price"),
            }),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest (or newest) first.
    #[default]
    Descending,
}

impl SortDirection {
    /// `asc` or `desc`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            _ => Err(DomainError::InvalidInput {
                field: "sortOrder",
                message: format!("'{s}' is not asc or desc"),
            }),
        }
    }
}
