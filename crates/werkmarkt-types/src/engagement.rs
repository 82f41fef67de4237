//! Engagements - the paid unit of work ("project" in the UI)
//!
//! An engagement is created the instant a proposal or booking is accepted
//! and then walks the state machine implemented in `werkmarkt-engagement`.

use crate::{split_fee, BookingId, Currency, EngagementId, PostingId, ProposalId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Engagement lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    /// Awaiting expert acceptance (direct client-initiated projects)
    Pending,
    /// Agreed, awaiting payment
    Accepted,
    /// Escrow funded, work can begin
    Paid,
    /// Expert is working
    InProgress,
    /// Expert delivered, awaiting client review
    Delivered,
    /// Client requested a revision
    Revision,
    /// Client approved; terminal success state
    Completed,
    /// Cancelled before completion; terminal
    Cancelled,
    /// Under platform arbitration
    Disputed,
    /// Dispute resolved with a refund; terminal
    Refunded,
}

impl EngagementStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EngagementStatus::Completed | EngagementStatus::Cancelled | EngagementStatus::Refunded
        )
    }
}

/// Revision allowance for an engagement.
///
/// The wire form keeps the legacy integer encoding (-1 means unlimited) so
/// existing clients keep parsing; internally the sentinel never reaches
/// arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionPolicy {
    Bounded(u16),
    Unlimited,
}

impl RevisionPolicy {
    pub fn allows_another(&self, used: u16) -> bool {
        match self {
            RevisionPolicy::Bounded(allowed) => used < *allowed,
            RevisionPolicy::Unlimited => true,
        }
    }
}

impl Serialize for RevisionPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RevisionPolicy::Bounded(n) => serializer.serialize_i32(*n as i32),
            RevisionPolicy::Unlimited => serializer.serialize_i32(-1),
        }
    }
}

impl<'de> Deserialize<'de> for RevisionPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i32::deserialize(deserializer)?;
        if raw < 0 {
            Ok(RevisionPolicy::Unlimited)
        } else {
            Ok(RevisionPolicy::Bounded(raw as u16))
        }
    }
}

/// Where an engagement came from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EngagementOrigin {
    /// A proposal accepted against a posting
    Posting {
        posting_id: PostingId,
        proposal_id: ProposalId,
    },
    /// A direct booking request accepted by the expert
    Booking { booking_id: BookingId },
    /// A direct service checkout without prior negotiation
    Direct,
}

/// The paid unit of work between one client and one expert
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub id: EngagementId,
    pub client_id: UserId,
    pub expert_id: UserId,
    pub origin: EngagementOrigin,
    pub title: String,
    pub price: i64,
    pub currency: Currency,
    pub platform_fee: i64,
    pub expert_payout: i64,
    pub status: EngagementStatus,
    pub revisions_used: u16,
    pub revisions_allowed: RevisionPolicy,
    pub delivery_date: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub is_disputed: bool,
    pub dispute_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Engagement {
    /// Create an engagement in the `accepted` state, with the platform fee
    /// split off the agreed price.
    pub fn accepted(
        client_id: UserId,
        expert_id: UserId,
        origin: EngagementOrigin,
        title: impl Into<String>,
        price: i64,
        currency: Currency,
        revisions_allowed: RevisionPolicy,
        delivery_date: Option<DateTime<Utc>>,
    ) -> Self {
        let (platform_fee, expert_payout) = split_fee(price);
        let now = Utc::now();
        Self {
            id: EngagementId::generate(),
            client_id,
            expert_id,
            origin,
            title: title.into(),
            price,
            currency,
            platform_fee,
            expert_payout,
            status: EngagementStatus::Accepted,
            revisions_used: 0,
            revisions_allowed,
            delivery_date,
            delivered_at: None,
            completed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            is_disputed: false,
            dispute_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn participant(&self, user_id: &UserId) -> bool {
        &self.client_id == user_id || &self.expert_id == user_id
    }

    /// The other side of the engagement, for review attribution.
    pub fn counterparty(&self, user_id: &UserId) -> Option<UserId> {
        if &self.client_id == user_id {
            Some(self.expert_id)
        } else if &self.expert_id == user_id {
            Some(self.client_id)
        } else {
            None
        }
    }

    /// Invariant: the fee split always reconstructs the price.
    pub fn fee_split_consistent(&self) -> bool {
        self.expert_payout + self.platform_fee == self.price
    }
}
