//! Booking request handlers

use crate::api::rest::extract::Caller;
use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use crate::storage::BookingStorage;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use werkmarkt_proposals::{BookingDraft, BookingResponse};
use werkmarkt_types::{ApiEnvelope, BookingId, BookingRequest, Engagement, PageParams, Paginated};

/// List the caller's booking requests (both sides)
pub async fn list_bookings(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<Paginated<BookingRequest>>> {
    let bookings = state
        .storage
        .list_bookings_for_user(&actor.user_id)
        .await?;
    Ok(Json(page.slice(bookings)))
}

/// Create a booking request against an expert
pub async fn submit_booking(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Json(draft): Json<BookingDraft>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<BookingRequest>>)> {
    let booking = state.storage.submit_booking(&actor, draft).await?;

    tracing::info!(
        booking_id = %booking.id,
        expert_id = %booking.expert_id,
        "submitted booking request"
    );
    Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(booking))))
}

/// Booking response payload: the booking and, on acceptance, the minted
/// engagement.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOutcome {
    pub booking: BookingRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement: Option<Engagement>,
}

/// Expert accepts or declines a pending booking
pub async fn respond_booking(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    Json(response): Json<BookingResponse>,
) -> ApiResult<Json<ApiEnvelope<BookingOutcome>>> {
    let (booking, engagement) = state
        .storage
        .respond_booking(&BookingId::from_uuid(id), &actor, response)
        .await?;

    Ok(Json(ApiEnvelope::ok(BookingOutcome {
        booking,
        engagement,
    })))
}

/// Client withdraws a pending booking
pub async fn cancel_booking(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<BookingRequest>>> {
    let booking = state
        .storage
        .cancel_booking(&BookingId::from_uuid(id), &actor)
        .await?;
    Ok(Json(ApiEnvelope::with_message(booking, "booking cancelled")))
}
