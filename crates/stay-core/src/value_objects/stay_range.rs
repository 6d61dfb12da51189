//! Stay range - the half-open `[check_in, check_out)` night interval of a booking

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Calendar-date interval covering the nights from `check_in` up to, but not
/// including, `check_out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    /// Build a range, rejecting reversed and zero-length stays
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, DomainError> {
        if check_in >= check_out {
            return Err(DomainError::InvalidDateRange {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    #[inline]
    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    #[inline]
    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Number of nights in the stay (always >= 1)
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Two stays share a night iff `a.in < b.out && a.out > b.in`.
    ///
    /// Containment in either direction reduces to the same inequality, and
    /// back-to-back stays (`a.out == b.in`) do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && self.check_out > other.check_in
    }

    /// Whether the stay has fully ended before `date`
    #[inline]
    pub fn ended_before(&self, date: NaiveDate) -> bool {
        self.check_out < date
    }
}
