//! Reviews - post-completion ratings between engagement participants

use crate::{EngagementId, ReviewId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rating plus free text, scoped to one engagement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub engagement_id: EngagementId,
    pub reviewer_id: UserId,
    pub reviewee_id: UserId,
    pub rating: u8,
    pub communication_rating: Option<u8>,
    pub quality_rating: Option<u8>,
    pub timeliness_rating: Option<u8>,
    pub value_rating: Option<u8>,
    pub title: Option<String>,
    pub content: String,
    pub is_verified: bool,
    pub is_public: bool,
    pub helpful_count: u32,
    pub response: Option<String>,
    pub response_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission payload for a new review
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub rating: u8,
    #[serde(default)]
    pub communication_rating: Option<u8>,
    #[serde(default)]
    pub quality_rating: Option<u8>,
    #[serde(default)]
    pub timeliness_rating: Option<u8>,
    #[serde(default)]
    pub value_rating: Option<u8>,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

fn default_public() -> bool {
    true
}

/// Five-tier rating distribution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDistribution {
    pub five_star: u32,
    pub four_star: u32,
    pub three_star: u32,
    pub two_star: u32,
    pub one_star: u32,
}

/// Aggregate over a reviewee's raw review set.
///
/// Always recomputed from the reviews themselves, never stored as ground
/// truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub total_reviews: u32,
    pub average_rating: f64,
    pub average_communication: Option<f64>,
    pub average_quality: Option<f64>,
    pub average_timeliness: Option<f64>,
    pub average_value: Option<f64>,
    pub rating_distribution: RatingDistribution,
}
