//! Booking requests - the direct purchase road into an engagement

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use werkmarkt_types::{
    ActorContext, BookingId, BookingRequest, BookingStatus, Currency, Engagement,
    EngagementOrigin, UserId,
};

use crate::DEFAULT_REVISIONS;

const MESSAGE_MIN: usize = 20;

/// Bookings expire when the expert never responds.
const DEFAULT_TTL_DAYS: i64 = 7;

/// Booking negotiation failures
#[derive(Debug, Error)]
pub enum BookingError {
    /// The booking passed its expiry before the expert responded
    #[error("Booking request has expired")]
    Expired,

    /// The booking already left its pending state
    #[error("Illegal booking transition from {from:?}")]
    IllegalTransition { from: BookingStatus },

    /// Permission or precondition failure
    #[error("Not eligible: {0}")]
    NotEligible(String),

    /// Malformed request
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Client-submitted booking request fields
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub expert_id: UserId,
    #[serde(default)]
    pub service_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub proposed_budget: Option<i64>,
    pub currency: Currency,
    #[serde(default)]
    pub proposed_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub proposed_deadline: Option<DateTime<Utc>>,
}

/// Expert's answer to a booking request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub accept: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Create a pending booking request from a client to an expert.
pub fn new_booking(
    client: &ActorContext,
    draft: BookingDraft,
) -> Result<BookingRequest, BookingError> {
    if client.is(&draft.expert_id) {
        return Err(BookingError::NotEligible("cannot book yourself".into()));
    }
    if draft.message.trim().chars().count() < MESSAGE_MIN {
        return Err(BookingError::Validation(format!(
            "message must be at least {} characters",
            MESSAGE_MIN
        )));
    }
    if matches!(draft.proposed_budget, Some(b) if b <= 0) {
        return Err(BookingError::Validation(
            "proposed budget must be positive".into(),
        ));
    }

    let now = Utc::now();
    Ok(BookingRequest {
        id: BookingId::generate(),
        client_id: client.user_id,
        expert_id: draft.expert_id,
        service_id: draft.service_id,
        message: draft.message,
        proposed_budget: draft.proposed_budget,
        currency: draft.currency,
        proposed_start_date: draft.proposed_start_date,
        proposed_deadline: draft.proposed_deadline,
        status: BookingStatus::Pending,
        expert_response: None,
        responded_at: None,
        expires_at: now + Duration::days(DEFAULT_TTL_DAYS),
        created_at: now,
        updated_at: now,
    })
}

/// Expert accepts or declines a pending booking.
///
/// Acceptance mints an engagement from the proposed budget, exactly like a
/// proposal acceptance does. Responding to an expired booking marks it
/// expired and fails.
pub fn respond_booking(
    booking: &mut BookingRequest,
    actor: &ActorContext,
    response: BookingResponse,
) -> Result<Option<Engagement>, BookingError> {
    if !actor.is(&booking.expert_id) {
        return Err(BookingError::NotEligible(
            "only the booked expert may respond".into(),
        ));
    }
    if booking.status != BookingStatus::Pending {
        return Err(BookingError::IllegalTransition {
            from: booking.status,
        });
    }

    let now = Utc::now();
    if booking.is_expired_at(now) {
        booking.status = BookingStatus::Expired;
        booking.updated_at = now;
        return Err(BookingError::Expired);
    }

    // Budget guard runs before the first mutation; a refused accept leaves
    // the booking pending and untouched.
    let price = if response.accept {
        Some(booking.proposed_budget.ok_or_else(|| {
            BookingError::Validation("cannot accept a booking without an agreed budget".into())
        })?)
    } else {
        None
    };

    booking.expert_response = response.message;
    booking.responded_at = Some(now);
    booking.updated_at = now;

    let Some(price) = price else {
        booking.status = BookingStatus::Declined;
        return Ok(None);
    };

    booking.status = BookingStatus::Accepted;
    let engagement = Engagement::accepted(
        booking.client_id,
        booking.expert_id,
        EngagementOrigin::Booking {
            booking_id: booking.id,
        },
        booking.message.chars().take(80).collect::<String>(),
        price,
        booking.currency,
        DEFAULT_REVISIONS,
        booking.proposed_deadline,
    );

    tracing::info!(
        booking_id = %booking.id,
        engagement_id = %engagement.id,
        "accepted booking request"
    );
    Ok(Some(engagement))
}

/// Client withdraws a pending booking.
pub fn cancel_booking(
    booking: &mut BookingRequest,
    actor: &ActorContext,
) -> Result<(), BookingError> {
    if !actor.is(&booking.client_id) {
        return Err(BookingError::NotEligible(
            "only the requesting client may cancel".into(),
        ));
    }
    if booking.status != BookingStatus::Pending {
        return Err(BookingError::IllegalTransition {
            from: booking.status,
        });
    }
    booking.status = BookingStatus::Cancelled;
    booking.updated_at = Utc::now();
    Ok(())
}
