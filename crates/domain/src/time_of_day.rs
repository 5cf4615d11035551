// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wall-clock times compared as minutes since midnight.

use crate::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day with minute precision.
///
/// Accepts `H:MM`, `HH:MM` and `HH:MM:SS` (seconds are dropped). Renders
/// as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    /// Creates a time from minutes since midnight.
    ///
    /// # Errors
    ///
    /// Returns an error if `minutes` is not within a single day.
    pub fn from_minutes(minutes: u16) -> Result<Self, DomainError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(DomainError::InvalidInput {
                field: "time",
                message: format!("{minutes} minutes is past the end of the day"),
            });
        }
        Ok(Self { minutes })
    }

    /// Creates a time from an hour and minute.
    ///
    /// # Errors
    ///
    /// Returns an error if the hour or minute is out of range.
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, DomainError> {
        if hour > 23 || minute > 59 {
            return Err(DomainError::InvalidInput {
                field: "time",
                message: format!("{hour}:{minute:02} is not a valid time of day"),
            });
        }
        Ok(Self {
            minutes: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    /// Minutes elapsed since midnight.
    #[must_use]
    pub const fn minutes_since_midnight(&self) -> u16 {
        self.minutes
    }

    /// The hour component (0-23).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn hour(&self) -> u8 {
        (self.minutes / 60) as u8
    }

    /// The minute component (0-59).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn minute(&self) -> u8 {
        (self.minutes % 60) as u8
    }

    /// Converts to a `time::Time`.
    #[must_use]
    pub const fn to_time(&self) -> time::Time {
        match time::Time::from_hms(self.hour(), self.minute(), 0) {
            Ok(t) => t,
            Err(_) => time::Time::MIDNIGHT,
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidInput {
            field: "time",
            message: format!("'{s}' is not a time in HH:MM format"),
        };

        let mut parts = s.trim().split(':');
        let hour = parts.next().ok_or_else(invalid)?;
        let minute = parts.next().ok_or_else(invalid)?;
        let second = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
        if hour.len() > 2 || !all_digits(hour) || minute.len() != 2 || !all_digits(minute) {
            return Err(invalid());
        }
        if let Some(sec) = second {
            let valid =
                sec.len() == 2 && all_digits(sec) && sec.parse::<u8>().is_ok_and(|v| v < 60);
            if !valid {
                return Err(invalid());
            }
        }

        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl FromStr for TimeOfDay {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_str(&raw).map_err(serde::de::Error::custom)
    }
}
