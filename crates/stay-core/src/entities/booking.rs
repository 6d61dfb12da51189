//! Booking entity - a confirmed stay and its lifecycle
//!
//! ```text
//! Booked ──sweep──▶ Completed
//!   │
//!   └──cancel────▶ Cancelled
//! ```
//! Completed and Cancelled are terminal.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{Snowflake, StayRange};

/// Lifecycle status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Booked,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Storage representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Booked and Completed stays occupy the listing's calendar
    #[inline]
    pub fn blocks_calendar(self) -> bool {
        matches!(self, Self::Booked | Self::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Booked => "Booked",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "booked" => Ok(Self::Booked),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(DomainError::InternalError(format!(
                "unknown booking status: {other}"
            ))),
        }
    }
}

/// Where the refund of a cancelled booking stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    #[default]
    NotApplicable,
    Pending,
    Completed,
    Failed,
}

impl RefundStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotApplicable => "not_applicable",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for RefundStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_applicable" => Ok(Self::NotApplicable),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(DomainError::InternalError(format!(
                "unknown refund status: {other}"
            ))),
        }
    }
}

/// Booking entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: Snowflake,
    pub listing_id: Snowflake,
    pub guest_id: Snowflake,
    pub stay: StayRange,
    pub guests: i32,
    pub total_price: Decimal,
    pub payment_intent_id: String,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub refund_status: RefundStatus,
    pub refund_id: Option<String>,
}

impl Booking {
    /// Create a freshly booked reservation
    pub fn new(
        id: Snowflake,
        listing_id: Snowflake,
        guest_id: Snowflake,
        stay: StayRange,
        guests: i32,
        total_price: Decimal,
        payment_intent_id: String,
    ) -> Self {
        Self {
            id,
            listing_id,
            guest_id,
            stay,
            guests,
            total_price,
            payment_intent_id,
            status: BookingStatus::Booked,
            booked_at: Utc::now(),
            cancelled_at: None,
            cancellation_reason: None,
            refund_status: RefundStatus::NotApplicable,
            refund_id: None,
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }

    #[inline]
    pub fn blocks_calendar(&self) -> bool {
        self.status.blocks_calendar()
    }

    /// Booked → Cancelled. The refund is owed from this point on.
    pub fn cancel(&mut self, reason: String, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.require_booked("cancelled")?;
        self.status = BookingStatus::Cancelled;
        self.cancelled_at = Some(at);
        self.cancellation_reason = Some(reason);
        self.refund_status = RefundStatus::Pending;
        Ok(())
    }

    /// Booked → Completed, once the stay has ended before `as_of`
    pub fn complete(&mut self, as_of: NaiveDate) -> Result<(), DomainError> {
        self.require_booked("completed")?;
        if !self.stay.ended_before(as_of) {
            return Err(DomainError::InvalidState(format!(
                "booking {} checks out on {}",
                self.id,
                self.stay.check_out()
            )));
        }
        self.status = BookingStatus::Completed;
        Ok(())
    }

    /// Record the outcome of the refund attempt for a cancelled booking
    pub fn record_refund(&mut self, status: RefundStatus, refund_id: Option<String>) {
        self.refund_status = status;
        if refund_id.is_some() {
            self.refund_id = refund_id;
        }
    }

    fn require_booked(&self, action: &'static str) -> Result<(), DomainError> {
        if self.status == BookingStatus::Booked {
            Ok(())
        } else {
            Err(DomainError::InvalidBookingState {
                booking_id: self.id,
                status: self.status,
                action,
            })
        }
    }
}
