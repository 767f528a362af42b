//! Human-readable order numbers: `TORO-YYYY-NNN`
//!
//! The sequence restarts at 1 every calendar year and is zero-padded to at
//! least three digits; it keeps growing past 999 (`TORO-2025-1000`).
//!
//! Allocation goes through a [`SequenceCounter`]: a per-year counter that is
//! advanced atomically by whoever owns it. SQL backends implement it on their
//! connection type so the counter update and the order insert share one
//! transaction, which makes numbers unique under concurrent writers and never
//! reissued after a delete.

use crate::core::error::{StorageError, ToroError, ToroResult};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ORDER_NUMBER_PREFIX: &str = "TORO";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberError {
    #[error("year {0} does not fit in four digits")]
    YearOutOfRange(i32),

    #[error("sequence numbers start at 1")]
    ZeroSequence,

    #[error("'{0}' is not a valid order number (expected TORO-YYYY-NNN)")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderNumber {
    year: i32,
    sequence: u32,
}

impl OrderNumber {
    pub fn new(year: i32, sequence: u32) -> Result<Self, OrderNumberError> {
        if !(1..=9999).contains(&year) {
            return Err(OrderNumberError::YearOutOfRange(year));
        }
        if sequence == 0 {
            return Err(OrderNumberError::ZeroSequence);
        }
        Ok(Self { year, sequence })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:04}-{:03}",
            ORDER_NUMBER_PREFIX, self.year, self.sequence
        )
    }
}

impl FromStr for OrderNumber {
    type Err = OrderNumberError;

    /// Only the canonical rendering is accepted, so parsing and printing
    /// are inverse operations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || OrderNumberError::Malformed(s.to_string());

        let rest = s
            .strip_prefix(ORDER_NUMBER_PREFIX)
            .and_then(|r| r.strip_prefix('-'))
            .ok_or_else(malformed)?;
        let (year, sequence) = rest.split_once('-').ok_or_else(malformed)?;

        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || !all_digits(year) || !all_digits(sequence) {
            return Err(malformed());
        }

        let year = year.parse::<i32>().map_err(|_| malformed())?;
        let sequence = sequence.parse::<u32>().map_err(|_| malformed())?;
        let number = OrderNumber::new(year, sequence)?;

        if number.to_string() != s {
            return Err(malformed());
        }
        Ok(number)
    }
}

impl Serialize for OrderNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OrderNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A per-year counter owned by a store
#[async_trait]
pub trait SequenceCounter: Send {
    /// Advance the counter for `year` and return the new value. The first
    /// call for a year returns 1.
    async fn advance(&mut self, year: i32) -> ToroResult<u32>;
}

/// In-process counter, used by the in-memory store under its own lock
#[async_trait]
impl SequenceCounter for HashMap<i32, u32> {
    async fn advance(&mut self, year: i32) -> ToroResult<u32> {
        let slot = self.entry(year).or_insert(0);
        *slot = slot.checked_add(1).ok_or_else(|| StorageError::Integrity {
            message: format!("order sequence for {year} is exhausted"),
        })?;
        Ok(*slot)
    }
}

/// Produces the next order number for a year
pub struct OrderNumberGenerator;

impl OrderNumberGenerator {
    /// Allocate the next number for `year` from `counter`.
    ///
    /// Must run inside the same critical section (lock or transaction) as
    /// the insert that stores the number.
    pub async fn next<C>(counter: &mut C, year: i32) -> ToroResult<OrderNumber>
    where
        C: SequenceCounter + ?Sized,
    {
        if !(1..=9999).contains(&year) {
            return Err(ToroError::Internal(format!(
                "cannot number orders for year {year}"
            )));
        }

        let sequence = counter.advance(year).await?;
        OrderNumber::new(year, sequence).map_err(|e| {
            StorageError::Integrity {
                message: e.to_string(),
            }
            .into()
        })
    }
}
