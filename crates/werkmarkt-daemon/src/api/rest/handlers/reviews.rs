//! Review handlers

use crate::api::rest::extract::Caller;
use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use crate::storage::ReviewStorage;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use werkmarkt_types::{
    ApiEnvelope, EngagementId, PageParams, Paginated, Review, ReviewId, ReviewPayload,
    ReviewSummary, UserId,
};

/// Review submission body: the target engagement plus the review fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub engagement_id: Uuid,
    #[serde(flatten)]
    pub payload: ReviewPayload,
}

/// Submit a review against a completed engagement
pub async fn submit_review(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Json(request): Json<SubmitReviewRequest>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<Review>>)> {
    let review = state
        .storage
        .submit_review(
            &EngagementId::from_uuid(request.engagement_id),
            &actor,
            request.payload,
        )
        .await?;

    tracing::info!(
        review_id = %review.id,
        engagement_id = %review.engagement_id,
        rating = review.rating,
        "submitted review"
    );
    Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(review))))
}

/// List reviews received by a user
pub async fn list_reviews_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<Paginated<Review>>> {
    let reviews = state
        .storage
        .list_reviews_for_reviewee(&UserId::from_uuid(user_id))
        .await?;
    Ok(Json(page.slice(reviews)))
}

/// Aggregate rating summary for an expert, recomputed from the raw set
pub async fn review_summary(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<ReviewSummary>>> {
    let reviews = state
        .storage
        .list_reviews_for_reviewee(&UserId::from_uuid(user_id))
        .await?;
    Ok(Json(ApiEnvelope::ok(werkmarkt_reviews::summarize(&reviews))))
}

/// Review response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponseRequest {
    pub response: String,
}

/// Reviewee's one-time public response
pub async fn respond_to_review(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewResponseRequest>,
) -> ApiResult<Json<ApiEnvelope<Review>>> {
    let review = state
        .storage
        .respond_to_review(&ReviewId::from_uuid(id), &actor, request.response)
        .await?;
    Ok(Json(ApiEnvelope::ok(review)))
}

/// Mark a review as helpful
pub async fn mark_helpful(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<Review>>> {
    let review = state
        .storage
        .mark_review_helpful(&ReviewId::from_uuid(id))
        .await?;
    Ok(Json(ApiEnvelope::ok(review)))
}
