//! Project postings - client-authored requests for work

use crate::{Currency, PostingId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the budget of a posting is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetType {
    Fixed,
    Hourly,
    Range,
}

/// Posting lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingStatus {
    /// Visible only to its owner
    Draft,
    /// Accepting proposals
    Open,
    /// Owner is evaluating shortlisted proposals
    InReview,
    /// A proposal was accepted; an engagement exists
    Assigned,
    /// The resulting engagement completed
    Completed,
    /// Closed without a hire
    Cancelled,
}

impl PostingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PostingStatus::Completed | PostingStatus::Cancelled)
    }

    /// States in which proposals may still win the posting.
    pub fn accepts_award(&self) -> bool {
        matches!(self, PostingStatus::Open | PostingStatus::InReview)
    }
}

/// A client's request for work, open for expert bids
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    pub id: PostingId,
    pub client_id: UserId,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub category_id: Option<String>,
    pub skills_required: Vec<String>,
    pub tools_required: Vec<String>,
    pub budget_type: BudgetType,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub currency: Currency,
    pub deadline: Option<DateTime<Utc>>,
    pub estimated_duration: Option<String>,
    pub status: PostingStatus,
    pub is_urgent: bool,
    pub is_featured: bool,
    pub attachments: Vec<String>,
    pub view_count: u64,
    pub assigned_expert_id: Option<UserId>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Posting {
    /// Invariant: an expert is assigned if and only if the posting reached
    /// `assigned` or `completed`.
    pub fn assignment_consistent(&self) -> bool {
        self.assigned_expert_id.is_some()
            == matches!(
                self.status,
                PostingStatus::Assigned | PostingStatus::Completed
            )
    }
}
