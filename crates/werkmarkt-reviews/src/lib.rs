//! Werkmarkt Reviews - the gate between completion and reputation
//!
//! A review is only admissible once its engagement completed, at most once
//! per (engagement, reviewer) pair. Aggregates are always recomputed from
//! the raw review set; no stored rating can drift from its source.

use chrono::Utc;
use thiserror::Error;
use werkmarkt_types::{
    ActorContext, Engagement, EngagementStatus, RatingDistribution, Review, ReviewId,
    ReviewPayload, ReviewSummary,
};

pub const CONTENT_MIN: usize = 20;
const RESPONSE_MIN: usize = 10;

/// Review gate failures
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Engagement not completed, or the actor is not a participant
    #[error("Not eligible: {0}")]
    NotEligible(String),

    /// A review by this reviewer already exists for the engagement
    #[error("Review already exists for this engagement and reviewer")]
    DuplicateReview,

    /// Ratings out of range or content too short
    #[error("Validation error: {0}")]
    Validation(String),

    /// The reviewee already responded
    #[error("Review already has a response")]
    AlreadyResponded,
}

/// Admit a review against a completed engagement.
///
/// `existing` must be every review already recorded for the engagement;
/// the caller holds the lock (or unique constraint) that keeps that set
/// stable.
pub fn submit_review(
    engagement: &Engagement,
    existing: &[Review],
    reviewer: &ActorContext,
    payload: ReviewPayload,
) -> Result<Review, ReviewError> {
    if engagement.status != EngagementStatus::Completed {
        return Err(ReviewError::NotEligible(
            "engagement is not completed".into(),
        ));
    }
    let reviewee_id = engagement
        .counterparty(&reviewer.user_id)
        .ok_or_else(|| ReviewError::NotEligible("not a participant of this engagement".into()))?;

    if existing
        .iter()
        .any(|r| r.engagement_id == engagement.id && r.reviewer_id == reviewer.user_id)
    {
        return Err(ReviewError::DuplicateReview);
    }

    validate_rating("rating", payload.rating)?;
    for (name, value) in [
        ("communicationRating", payload.communication_rating),
        ("qualityRating", payload.quality_rating),
        ("timelinessRating", payload.timeliness_rating),
        ("valueRating", payload.value_rating),
    ] {
        if let Some(value) = value {
            validate_rating(name, value)?;
        }
    }
    if payload.content.trim().chars().count() < CONTENT_MIN {
        return Err(ReviewError::Validation(format!(
            "content must be at least {} characters",
            CONTENT_MIN
        )));
    }

    let now = Utc::now();
    let review = Review {
        id: ReviewId::generate(),
        engagement_id: engagement.id,
        reviewer_id: reviewer.user_id,
        reviewee_id,
        rating: payload.rating,
        communication_rating: payload.communication_rating,
        quality_rating: payload.quality_rating,
        timeliness_rating: payload.timeliness_rating,
        value_rating: payload.value_rating,
        title: payload.title,
        content: payload.content,
        // Reviews always originate from a completed engagement here.
        is_verified: true,
        is_public: payload.is_public,
        helpful_count: 0,
        response: None,
        response_at: None,
        created_at: now,
        updated_at: now,
    };

    tracing::debug!(review_id = %review.id, engagement_id = %engagement.id, "admitted review");
    Ok(review)
}

/// Reviewee responds to a review, once.
pub fn respond_to_review(
    review: &mut Review,
    actor: &ActorContext,
    response: String,
) -> Result<(), ReviewError> {
    if !actor.is(&review.reviewee_id) {
        return Err(ReviewError::NotEligible(
            "only the reviewee may respond".into(),
        ));
    }
    if review.response.is_some() {
        return Err(ReviewError::AlreadyResponded);
    }
    if response.trim().chars().count() < RESPONSE_MIN {
        return Err(ReviewError::Validation(format!(
            "response must be at least {} characters",
            RESPONSE_MIN
        )));
    }
    review.response = Some(response);
    review.response_at = Some(Utc::now());
    review.updated_at = Utc::now();
    Ok(())
}

/// Bump the helpful counter.
pub fn mark_helpful(review: &mut Review) {
    review.helpful_count += 1;
    review.updated_at = Utc::now();
}

/// Recompute the reviewee aggregate from the raw review set.
pub fn summarize(reviews: &[Review]) -> ReviewSummary {
    let total = reviews.len() as u32;
    let mut distribution = RatingDistribution::default();
    for review in reviews {
        match review.rating {
            5 => distribution.five_star += 1,
            4 => distribution.four_star += 1,
            3 => distribution.three_star += 1,
            2 => distribution.two_star += 1,
            _ => distribution.one_star += 1,
        }
    }

    ReviewSummary {
        total_reviews: total,
        average_rating: average(reviews.iter().map(|r| Some(r.rating))).unwrap_or(0.0),
        average_communication: average(reviews.iter().map(|r| r.communication_rating)),
        average_quality: average(reviews.iter().map(|r| r.quality_rating)),
        average_timeliness: average(reviews.iter().map(|r| r.timeliness_rating)),
        average_value: average(reviews.iter().map(|r| r.value_rating)),
        rating_distribution: distribution,
    }
}

fn average(values: impl Iterator<Item = Option<u8>>) -> Option<f64> {
    let (sum, count) = values
        .flatten()
        .fold((0u64, 0u64), |(sum, count), v| (sum + v as u64, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}

fn validate_rating(field: &str, value: u8) -> Result<(), ReviewError> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(ReviewError::Validation(format!(
            "{} must be between 1 and 5",
            field
        )))
    }
}
