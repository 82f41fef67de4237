//! Booking requests - direct client-to-expert purchase negotiation
//!
//! The second road into an engagement, next to the posting/proposal flow: a
//! client approaches one expert directly, and the expert accepts or
//! declines.

use crate::{BookingId, Currency, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
    Expired,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }
}

/// A direct service purchase request awaiting the expert's response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub id: BookingId,
    pub client_id: UserId,
    pub expert_id: UserId,
    pub service_id: Option<String>,
    pub message: String,
    pub proposed_budget: Option<i64>,
    pub currency: Currency,
    pub proposed_start_date: Option<DateTime<Utc>>,
    pub proposed_deadline: Option<DateTime<Utc>>,
    pub status: BookingStatus,
    pub expert_response: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRequest {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Pending && now > self.expires_at
    }
}
