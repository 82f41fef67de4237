//! Proposals - expert bids against an open posting

use crate::{Currency, PostingId, ProposalId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Proposal lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Shortlisted,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ProposalStatus {
    /// Accepted, rejected and withdrawn proposals are immutable.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            ProposalStatus::Accepted | ProposalStatus::Rejected | ProposalStatus::Withdrawn
        )
    }

    /// States from which the posting owner may still accept or reject.
    pub fn is_in_play(&self) -> bool {
        matches!(self, ProposalStatus::Pending | ProposalStatus::Shortlisted)
    }
}

/// An expert's bid against a posting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub posting_id: PostingId,
    pub expert_id: UserId,
    pub cover_letter: String,
    pub proposed_price: i64,
    pub currency: Currency,
    pub proposed_duration: Option<String>,
    pub attachments: Vec<String>,
    pub status: ProposalStatus,
    pub shortlisted_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission payload for a new proposal
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalBid {
    pub cover_letter: String,
    pub proposed_price: i64,
    pub currency: Currency,
    #[serde(default)]
    pub proposed_duration: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}
