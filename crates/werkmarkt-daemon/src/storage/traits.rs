//! Storage trait definitions
//!
//! Reads are plain lookups; writes that span a guard evaluation and a
//! mutation (accepting a proposal, transitioning an engagement, admitting
//! a review) are coordination methods the backend must execute atomically.
//! No second caller may interleave between the checks and the writes.

use crate::error::StorageResult;
use async_trait::async_trait;
use werkmarkt_engagement::EngagementEvent;
use werkmarkt_payments::GatewayEvent;
use werkmarkt_proposals::{BookingDraft, BookingResponse};
use werkmarkt_types::{
    ActorContext, BookingId, BookingRequest, Engagement, EngagementId, Payment, PaymentId, Payout,
    Posting, PostingId, Proposal, ProposalBid, ProposalId, Review, ReviewId, UserId,
};

/// Combined storage trait
#[async_trait]
pub trait Storage:
    PostingStorage
    + ProposalStorage
    + BookingStorage
    + EngagementStorage
    + ReviewStorage
    + PaymentStorage
    + Send
    + Sync
{
}

/// Storage for project postings
#[async_trait]
pub trait PostingStorage: Send + Sync {
    /// Get a posting by ID
    async fn get_posting(&self, id: &PostingId) -> StorageResult<Option<Posting>>;

    /// List all postings, newest first
    async fn list_postings(&self) -> StorageResult<Vec<Posting>>;

    /// Store a freshly created posting
    async fn insert_posting(&self, posting: Posting) -> StorageResult<()>;

    /// Publish a draft posting (idempotent when already open)
    async fn open_posting(&self, id: &PostingId, actor: &ActorContext) -> StorageResult<Posting>;

    /// Apply owner edits while the posting is draft or open
    async fn update_posting(
        &self,
        id: &PostingId,
        actor: &ActorContext,
        update: werkmarkt_catalog::PostingUpdate,
    ) -> StorageResult<Posting>;

    /// Close a posting without a hire, clearing any assignment
    async fn close_posting(
        &self,
        id: &PostingId,
        actor: &ActorContext,
        reason: Option<String>,
    ) -> StorageResult<Posting>;

    /// Bump the posting's view counter
    async fn record_posting_view(&self, id: &PostingId) -> StorageResult<()>;
}

/// Storage for proposals
#[async_trait]
pub trait ProposalStorage: Send + Sync {
    /// Get a proposal by ID
    async fn get_proposal(&self, id: &ProposalId) -> StorageResult<Option<Proposal>>;

    /// List proposals for a posting, newest first
    async fn list_proposals_for_posting(
        &self,
        posting_id: &PostingId,
    ) -> StorageResult<Vec<Proposal>>;

    /// Submit a bid against an open posting (atomic duplicate check)
    async fn submit_proposal(
        &self,
        posting_id: &PostingId,
        expert: &ActorContext,
        bid: ProposalBid,
    ) -> StorageResult<Proposal>;

    /// Shortlist a pending proposal (owner-only)
    async fn shortlist_proposal(
        &self,
        id: &ProposalId,
        actor: &ActorContext,
    ) -> StorageResult<Proposal>;

    /// Accept a proposal: assign the posting, retire rivals, mint the
    /// engagement. Atomic; a concurrent loser observes `AlreadyAssigned`.
    async fn accept_proposal(
        &self,
        id: &ProposalId,
        actor: &ActorContext,
    ) -> StorageResult<Engagement>;

    /// Reject a live proposal (owner-only)
    async fn reject_proposal(
        &self,
        id: &ProposalId,
        actor: &ActorContext,
        reason: Option<String>,
    ) -> StorageResult<Proposal>;

    /// Withdraw a live proposal (author-only)
    async fn withdraw_proposal(
        &self,
        id: &ProposalId,
        actor: &ActorContext,
    ) -> StorageResult<Proposal>;
}

/// Storage for booking requests
#[async_trait]
pub trait BookingStorage: Send + Sync {
    /// Get a booking by ID
    async fn get_booking(&self, id: &BookingId) -> StorageResult<Option<BookingRequest>>;

    /// List bookings where the user is client or expert, newest first
    async fn list_bookings_for_user(&self, user_id: &UserId)
        -> StorageResult<Vec<BookingRequest>>;

    /// Create a pending booking request
    async fn submit_booking(
        &self,
        client: &ActorContext,
        draft: BookingDraft,
    ) -> StorageResult<BookingRequest>;

    /// Expert accepts or declines; acceptance mints an engagement
    async fn respond_booking(
        &self,
        id: &BookingId,
        actor: &ActorContext,
        response: BookingResponse,
    ) -> StorageResult<(BookingRequest, Option<Engagement>)>;

    /// Client withdraws a pending booking
    async fn cancel_booking(
        &self,
        id: &BookingId,
        actor: &ActorContext,
    ) -> StorageResult<BookingRequest>;
}

/// Storage for engagements
#[async_trait]
pub trait EngagementStorage: Send + Sync {
    /// Get an engagement by ID
    async fn get_engagement(&self, id: &EngagementId) -> StorageResult<Option<Engagement>>;

    /// List all engagements, newest first
    async fn list_engagements(&self) -> StorageResult<Vec<Engagement>>;

    /// List engagements where the user is client or expert, newest first
    async fn list_engagements_for_user(
        &self,
        user_id: &UserId,
    ) -> StorageResult<Vec<Engagement>>;

    /// Apply one lifecycle event atomically; on rejection nothing changes
    async fn transition_engagement(
        &self,
        id: &EngagementId,
        actor: &ActorContext,
        event: EngagementEvent,
    ) -> StorageResult<Engagement>;
}

/// Storage for reviews
#[async_trait]
pub trait ReviewStorage: Send + Sync {
    /// Get a review by ID
    async fn get_review(&self, id: &ReviewId) -> StorageResult<Option<Review>>;

    /// List reviews received by a user, newest first
    async fn list_reviews_for_reviewee(&self, user_id: &UserId) -> StorageResult<Vec<Review>>;

    /// Admit a review against a completed engagement. The
    /// (engagement, reviewer) uniqueness check runs under the same lock
    /// as the insert.
    async fn submit_review(
        &self,
        engagement_id: &EngagementId,
        reviewer: &ActorContext,
        payload: werkmarkt_types::ReviewPayload,
    ) -> StorageResult<Review>;

    /// Reviewee's one-time public response
    async fn respond_to_review(
        &self,
        id: &ReviewId,
        actor: &ActorContext,
        response: String,
    ) -> StorageResult<Review>;

    /// Bump a review's helpful counter
    async fn mark_review_helpful(&self, id: &ReviewId) -> StorageResult<Review>;
}

/// Storage for the payment ledger
#[async_trait]
pub trait PaymentStorage: Send + Sync {
    /// Get a payment by ID
    async fn get_payment(&self, id: &PaymentId) -> StorageResult<Option<Payment>>;

    /// Store a pending payment created alongside a checkout session
    async fn insert_payment(&self, payment: Payment) -> StorageResult<()>;

    /// Apply a gateway webhook: settle or fail the payment and drive the
    /// matching engagement transition in the same atomic step. Redelivered
    /// success notifications are no-ops.
    async fn settle_checkout(&self, event: GatewayEvent) -> StorageResult<Payment>;

    /// Record a payout request
    async fn insert_payout(&self, payout: Payout) -> StorageResult<()>;

    /// List payouts requested by an expert, newest first
    async fn list_payouts_for_expert(&self, expert_id: &UserId) -> StorageResult<Vec<Payout>>;
}
