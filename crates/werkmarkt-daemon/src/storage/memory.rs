//! In-memory storage implementation
//!
//! Lock acquisition always follows the field order below (postings,
//! proposals, bookings, engagements, reviews, payments, payouts), so the
//! coordination methods can hold several write guards without deadlocking.
//! Every check-and-mutate runs entirely inside its critical section.

use super::traits::*;
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;
use werkmarkt_engagement::EngagementEvent;
use werkmarkt_payments::GatewayEvent;
use werkmarkt_proposals::{BookingDraft, BookingResponse};
use werkmarkt_types::{
    ActorContext, BookingId, BookingRequest, Engagement, EngagementId, Payment, PaymentId,
    PaymentStatus, Payout, PayoutId, Posting, PostingId, Proposal, ProposalBid, ProposalId,
    Review, ReviewId, ReviewPayload, UserId,
};

/// In-memory storage for development and testing
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    postings: RwLock<HashMap<PostingId, Posting>>,
    proposals: RwLock<HashMap<ProposalId, Proposal>>,
    bookings: RwLock<HashMap<BookingId, BookingRequest>>,
    engagements: RwLock<HashMap<EngagementId, Engagement>>,
    reviews: RwLock<HashMap<ReviewId, Review>>,
    payments: RwLock<HashMap<PaymentId, Payment>>,
    payouts: RwLock<HashMap<PayoutId, Payout>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for InMemoryStorage {}

#[async_trait]
impl PostingStorage for InMemoryStorage {
    async fn get_posting(&self, id: &PostingId) -> StorageResult<Option<Posting>> {
        let postings = self.postings.read().await;
        Ok(postings.get(id).cloned())
    }

    async fn list_postings(&self) -> StorageResult<Vec<Posting>> {
        let postings = self.postings.read().await;
        let mut all: Vec<Posting> = postings.values().cloned().collect();
        all.sort_by_key(|p| Reverse(p.created_at));
        Ok(all)
    }

    async fn insert_posting(&self, posting: Posting) -> StorageResult<()> {
        let mut postings = self.postings.write().await;
        postings.insert(posting.id, posting);
        Ok(())
    }

    async fn open_posting(&self, id: &PostingId, actor: &ActorContext) -> StorageResult<Posting> {
        let mut postings = self.postings.write().await;
        let posting = postings
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("posting {}", id)))?;
        werkmarkt_catalog::open_posting(posting, actor)?;
        Ok(posting.clone())
    }

    async fn update_posting(
        &self,
        id: &PostingId,
        actor: &ActorContext,
        update: werkmarkt_catalog::PostingUpdate,
    ) -> StorageResult<Posting> {
        let mut postings = self.postings.write().await;
        let posting = postings
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("posting {}", id)))?;
        werkmarkt_catalog::update_posting(posting, actor, update)?;
        Ok(posting.clone())
    }

    async fn close_posting(
        &self,
        id: &PostingId,
        actor: &ActorContext,
        reason: Option<String>,
    ) -> StorageResult<Posting> {
        let mut postings = self.postings.write().await;
        let posting = postings
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("posting {}", id)))?;
        werkmarkt_catalog::close_posting(posting, actor, reason)?;
        Ok(posting.clone())
    }

    async fn record_posting_view(&self, id: &PostingId) -> StorageResult<()> {
        let mut postings = self.postings.write().await;
        let posting = postings
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("posting {}", id)))?;
        posting.view_count += 1;
        Ok(())
    }
}

#[async_trait]
impl ProposalStorage for InMemoryStorage {
    async fn get_proposal(&self, id: &ProposalId) -> StorageResult<Option<Proposal>> {
        let proposals = self.proposals.read().await;
        Ok(proposals.get(id).cloned())
    }

    async fn list_proposals_for_posting(
        &self,
        posting_id: &PostingId,
    ) -> StorageResult<Vec<Proposal>> {
        let proposals = self.proposals.read().await;
        let mut matching: Vec<Proposal> = proposals
            .values()
            .filter(|p| &p.posting_id == posting_id)
            .cloned()
            .collect();
        matching.sort_by_key(|p| Reverse(p.created_at));
        Ok(matching)
    }

    async fn submit_proposal(
        &self,
        posting_id: &PostingId,
        expert: &ActorContext,
        bid: ProposalBid,
    ) -> StorageResult<Proposal> {
        // Holding the postings lock keeps the open-status check stable
        // against a concurrent accept.
        let postings = self.postings.read().await;
        let mut proposals = self.proposals.write().await;

        let posting = postings
            .get(posting_id)
            .ok_or_else(|| StorageError::NotFound(format!("posting {}", posting_id)))?;
        let existing: Vec<Proposal> = proposals
            .values()
            .filter(|p| &p.posting_id == posting_id)
            .cloned()
            .collect();

        let proposal = werkmarkt_proposals::submit_proposal(posting, &existing, expert, bid)?;
        proposals.insert(proposal.id, proposal.clone());
        Ok(proposal)
    }

    async fn shortlist_proposal(
        &self,
        id: &ProposalId,
        actor: &ActorContext,
    ) -> StorageResult<Proposal> {
        let postings = self.postings.read().await;
        let mut proposals = self.proposals.write().await;

        let proposal = proposals
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("proposal {}", id)))?;
        let posting = postings
            .get(&proposal.posting_id)
            .ok_or_else(|| StorageError::NotFound(format!("posting {}", proposal.posting_id)))?;

        werkmarkt_proposals::shortlist(posting, proposal, actor)?;
        Ok(proposal.clone())
    }

    async fn accept_proposal(
        &self,
        id: &ProposalId,
        actor: &ActorContext,
    ) -> StorageResult<Engagement> {
        let mut postings = self.postings.write().await;
        let mut proposals = self.proposals.write().await;
        let mut engagements = self.engagements.write().await;

        let posting_id = proposals
            .get(id)
            .map(|p| p.posting_id)
            .ok_or_else(|| StorageError::NotFound(format!("proposal {}", id)))?;
        let posting = postings
            .get_mut(&posting_id)
            .ok_or_else(|| StorageError::NotFound(format!("posting {}", posting_id)))?;

        let mut siblings: Vec<Proposal> = proposals
            .values()
            .filter(|p| p.posting_id == posting_id)
            .cloned()
            .collect();

        let award = werkmarkt_proposals::accept_proposal(posting, &mut siblings, id, actor)?;

        for proposal in siblings {
            proposals.insert(proposal.id, proposal);
        }
        engagements.insert(award.engagement.id, award.engagement.clone());
        Ok(award.engagement)
    }

    async fn reject_proposal(
        &self,
        id: &ProposalId,
        actor: &ActorContext,
        reason: Option<String>,
    ) -> StorageResult<Proposal> {
        let postings = self.postings.read().await;
        let mut proposals = self.proposals.write().await;

        let proposal = proposals
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("proposal {}", id)))?;
        let posting = postings
            .get(&proposal.posting_id)
            .ok_or_else(|| StorageError::NotFound(format!("posting {}", proposal.posting_id)))?;

        werkmarkt_proposals::reject_proposal(posting, proposal, actor, reason)?;
        Ok(proposal.clone())
    }

    async fn withdraw_proposal(
        &self,
        id: &ProposalId,
        actor: &ActorContext,
    ) -> StorageResult<Proposal> {
        let mut proposals = self.proposals.write().await;
        let proposal = proposals
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("proposal {}", id)))?;
        werkmarkt_proposals::withdraw_proposal(proposal, actor)?;
        Ok(proposal.clone())
    }
}

#[async_trait]
impl BookingStorage for InMemoryStorage {
    async fn get_booking(&self, id: &BookingId) -> StorageResult<Option<BookingRequest>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(id).cloned())
    }

    async fn list_bookings_for_user(
        &self,
        user_id: &UserId,
    ) -> StorageResult<Vec<BookingRequest>> {
        let bookings = self.bookings.read().await;
        let mut matching: Vec<BookingRequest> = bookings
            .values()
            .filter(|b| &b.client_id == user_id || &b.expert_id == user_id)
            .cloned()
            .collect();
        matching.sort_by_key(|b| Reverse(b.created_at));
        Ok(matching)
    }

    async fn submit_booking(
        &self,
        client: &ActorContext,
        draft: BookingDraft,
    ) -> StorageResult<BookingRequest> {
        let booking = werkmarkt_proposals::new_booking(client, draft)?;
        let mut bookings = self.bookings.write().await;
        bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn respond_booking(
        &self,
        id: &BookingId,
        actor: &ActorContext,
        response: BookingResponse,
    ) -> StorageResult<(BookingRequest, Option<Engagement>)> {
        let mut bookings = self.bookings.write().await;
        let mut engagements = self.engagements.write().await;

        let booking = bookings
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("booking {}", id)))?;

        // An expired booking is marked as such even though the response
        // itself is refused, so the state change must outlive the error.
        let engagement = werkmarkt_proposals::respond_booking(booking, actor, response)?;
        if let Some(engagement) = &engagement {
            engagements.insert(engagement.id, engagement.clone());
        }
        Ok((booking.clone(), engagement))
    }

    async fn cancel_booking(
        &self,
        id: &BookingId,
        actor: &ActorContext,
    ) -> StorageResult<BookingRequest> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("booking {}", id)))?;
        werkmarkt_proposals::cancel_booking(booking, actor)?;
        Ok(booking.clone())
    }
}

#[async_trait]
impl EngagementStorage for InMemoryStorage {
    async fn get_engagement(&self, id: &EngagementId) -> StorageResult<Option<Engagement>> {
        let engagements = self.engagements.read().await;
        Ok(engagements.get(id).cloned())
    }

    async fn list_engagements(&self) -> StorageResult<Vec<Engagement>> {
        let engagements = self.engagements.read().await;
        let mut all: Vec<Engagement> = engagements.values().cloned().collect();
        all.sort_by_key(|e| Reverse(e.created_at));
        Ok(all)
    }

    async fn list_engagements_for_user(
        &self,
        user_id: &UserId,
    ) -> StorageResult<Vec<Engagement>> {
        let engagements = self.engagements.read().await;
        let mut matching: Vec<Engagement> = engagements
            .values()
            .filter(|e| e.participant(user_id))
            .cloned()
            .collect();
        matching.sort_by_key(|e| Reverse(e.created_at));
        Ok(matching)
    }

    async fn transition_engagement(
        &self,
        id: &EngagementId,
        actor: &ActorContext,
        event: EngagementEvent,
    ) -> StorageResult<Engagement> {
        let mut engagements = self.engagements.write().await;
        let engagement = engagements
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("engagement {}", id)))?;
        werkmarkt_engagement::transition(engagement, actor, event)?;
        Ok(engagement.clone())
    }
}

#[async_trait]
impl ReviewStorage for InMemoryStorage {
    async fn get_review(&self, id: &ReviewId) -> StorageResult<Option<Review>> {
        let reviews = self.reviews.read().await;
        Ok(reviews.get(id).cloned())
    }

    async fn list_reviews_for_reviewee(&self, user_id: &UserId) -> StorageResult<Vec<Review>> {
        let reviews = self.reviews.read().await;
        let mut matching: Vec<Review> = reviews
            .values()
            .filter(|r| &r.reviewee_id == user_id)
            .cloned()
            .collect();
        matching.sort_by_key(|r| Reverse(r.created_at));
        Ok(matching)
    }

    async fn submit_review(
        &self,
        engagement_id: &EngagementId,
        reviewer: &ActorContext,
        payload: ReviewPayload,
    ) -> StorageResult<Review> {
        let engagements = self.engagements.read().await;
        let mut reviews = self.reviews.write().await;

        let engagement = engagements
            .get(engagement_id)
            .ok_or_else(|| StorageError::NotFound(format!("engagement {}", engagement_id)))?;
        let existing: Vec<Review> = reviews
            .values()
            .filter(|r| &r.engagement_id == engagement_id)
            .cloned()
            .collect();

        let review = werkmarkt_reviews::submit_review(engagement, &existing, reviewer, payload)?;
        reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn respond_to_review(
        &self,
        id: &ReviewId,
        actor: &ActorContext,
        response: String,
    ) -> StorageResult<Review> {
        let mut reviews = self.reviews.write().await;
        let review = reviews
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("review {}", id)))?;
        werkmarkt_reviews::respond_to_review(review, actor, response)?;
        Ok(review.clone())
    }

    async fn mark_review_helpful(&self, id: &ReviewId) -> StorageResult<Review> {
        let mut reviews = self.reviews.write().await;
        let review = reviews
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("review {}", id)))?;
        werkmarkt_reviews::mark_helpful(review);
        Ok(review.clone())
    }
}

#[async_trait]
impl PaymentStorage for InMemoryStorage {
    async fn get_payment(&self, id: &PaymentId) -> StorageResult<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(id).cloned())
    }

    async fn insert_payment(&self, payment: Payment) -> StorageResult<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id, payment);
        Ok(())
    }

    async fn settle_checkout(&self, event: GatewayEvent) -> StorageResult<Payment> {
        let mut engagements = self.engagements.write().await;
        let mut payments = self.payments.write().await;

        let session_id = match &event {
            GatewayEvent::CheckoutCompleted { session_id }
            | GatewayEvent::CheckoutFailed { session_id, .. } => session_id.clone(),
        };
        let payment = payments
            .values_mut()
            .find(|p| p.session_id.as_ref() == Some(&session_id))
            .ok_or_else(|| {
                StorageError::Payment(werkmarkt_payments::PaymentError::UnknownSession(
                    session_id.to_string(),
                ))
            })?;

        let system = ActorContext::system();
        match event {
            GatewayEvent::CheckoutCompleted { .. } => {
                let now = Utc::now();
                payment.status = PaymentStatus::Succeeded;
                payment.paid_at.get_or_insert(now);
                payment.updated_at = now;

                // Redelivery lands here too; mark_paid no-ops once the
                // charge has been applied.
                if let Some(engagement) = engagements.get_mut(&payment.engagement_id) {
                    werkmarkt_engagement::transition(
                        engagement,
                        &system,
                        EngagementEvent::MarkPaid {
                            payment: payment.clone(),
                        },
                    )?;
                }
            }
            GatewayEvent::CheckoutFailed { reason, .. } => {
                payment.status = PaymentStatus::Failed;
                payment.failure_reason = reason;
                payment.updated_at = Utc::now();

                if let Some(engagement) = engagements.get_mut(&payment.engagement_id) {
                    let result = werkmarkt_engagement::transition(
                        engagement,
                        &system,
                        EngagementEvent::Cancel {
                            reason: "payment_failed".to_string(),
                        },
                    );
                    // A failure notice for a long-settled charge cannot
                    // cancel active work; record the payment failure only.
                    if let Err(err) = result {
                        tracing::warn!(
                            engagement_id = %payment.engagement_id,
                            error = %err,
                            "payment failure did not cancel engagement"
                        );
                    }
                }
            }
        }
        Ok(payment.clone())
    }

    async fn insert_payout(&self, payout: Payout) -> StorageResult<()> {
        let mut payouts = self.payouts.write().await;
        payouts.insert(payout.id, payout);
        Ok(())
    }

    async fn list_payouts_for_expert(&self, expert_id: &UserId) -> StorageResult<Vec<Payout>> {
        let payouts = self.payouts.read().await;
        let mut matching: Vec<Payout> = payouts
            .values()
            .filter(|p| &p.expert_id == expert_id)
            .cloned()
            .collect();
        matching.sort_by_key(|p| Reverse(p.created_at));
        Ok(matching)
    }
}
