//! Werkmarkt Proposals - the negotiation that precedes an engagement
//!
//! Experts bid on open postings; the posting owner shortlists, rejects or
//! accepts. Acceptance is the coordination point of the whole marketplace:
//! it must award the posting to exactly one proposal, retire all others,
//! and mint the engagement, as one atomic unit. The functions here are
//! pure over in-memory state; the storage layer is responsible for calling
//! them inside a single critical section.
//!
//! The second negotiation road, direct booking requests, lives in
//! [`booking`].

pub mod booking;

use chrono::Utc;
use thiserror::Error;
use werkmarkt_types::{
    ActorContext, Engagement, EngagementOrigin, Posting, PostingStatus, Proposal, ProposalBid,
    ProposalId, ProposalStatus, RevisionPolicy,
};

pub use booking::{
    cancel_booking, new_booking, respond_booking, BookingDraft, BookingError, BookingResponse,
};

const COVER_LETTER_MIN: usize = 50;

/// Revisions granted to engagements minted from an accepted proposal.
pub const DEFAULT_REVISIONS: RevisionPolicy = RevisionPolicy::Bounded(2);

/// Proposal negotiation failures
#[derive(Debug, Error)]
pub enum ProposalError {
    /// The posting is not accepting bids
    #[error("Posting is not open for proposals (status {status:?})")]
    PostingClosed { status: PostingStatus },

    /// The expert already holds a live proposal on this posting
    #[error("Expert already submitted a proposal for this posting")]
    DuplicateProposal,

    /// Another proposal won the posting first
    #[error("Posting is already assigned")]
    AlreadyAssigned,

    /// The proposal is settled and can no longer move
    #[error("Illegal proposal transition from {from:?}")]
    IllegalTransition { from: ProposalStatus },

    /// The proposal does not belong to the posting named in the request
    #[error("Proposal does not belong to this posting")]
    PostingMismatch,

    /// Only the posting owner drives shortlist/accept/reject
    #[error("Not the posting owner")]
    NotOwner,

    /// Only the bidding expert may withdraw
    #[error("Not the proposal author")]
    NotAuthor,

    /// Permission or precondition failure distinct from validation
    #[error("Not eligible: {0}")]
    NotEligible(String),

    /// Malformed bid
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Everything `accept_proposal` decided in one atomic step.
#[derive(Debug)]
pub struct Award {
    pub proposal_id: ProposalId,
    pub engagement: Engagement,
}

/// Submit a bid against an open posting.
///
/// `existing` must be every proposal already recorded for the posting; the
/// caller holds the lock that keeps that set stable.
pub fn submit_proposal(
    posting: &Posting,
    existing: &[Proposal],
    expert: &ActorContext,
    bid: ProposalBid,
) -> Result<Proposal, ProposalError> {
    if posting.status != PostingStatus::Open {
        return Err(ProposalError::PostingClosed {
            status: posting.status,
        });
    }
    if expert.is(&posting.client_id) {
        return Err(ProposalError::NotEligible(
            "cannot bid on your own posting".into(),
        ));
    }
    if bid.cover_letter.trim().chars().count() < COVER_LETTER_MIN {
        return Err(ProposalError::Validation(format!(
            "cover letter must be at least {} characters",
            COVER_LETTER_MIN
        )));
    }
    if bid.proposed_price <= 0 {
        return Err(ProposalError::Validation(
            "proposed price must be positive".into(),
        ));
    }
    let duplicate = existing.iter().any(|p| {
        p.expert_id == expert.user_id && p.status != ProposalStatus::Withdrawn
    });
    if duplicate {
        return Err(ProposalError::DuplicateProposal);
    }

    let now = Utc::now();
    let proposal = Proposal {
        id: ProposalId::generate(),
        posting_id: posting.id,
        expert_id: expert.user_id,
        cover_letter: bid.cover_letter,
        proposed_price: bid.proposed_price,
        currency: bid.currency,
        proposed_duration: bid.proposed_duration,
        attachments: bid.attachments,
        status: ProposalStatus::Pending,
        shortlisted_at: None,
        accepted_at: None,
        rejected_at: None,
        rejection_reason: None,
        withdrawn_at: None,
        created_at: now,
        updated_at: now,
    };

    tracing::debug!(proposal_id = %proposal.id, posting_id = %posting.id, "submitted proposal");
    Ok(proposal)
}

/// Move a pending proposal onto the owner's shortlist. A no-op when it is
/// already shortlisted.
pub fn shortlist(
    posting: &Posting,
    proposal: &mut Proposal,
    actor: &ActorContext,
) -> Result<(), ProposalError> {
    require_owner(posting, actor)?;
    require_same_posting(posting, proposal)?;

    match proposal.status {
        ProposalStatus::Shortlisted => Ok(()),
        ProposalStatus::Pending => {
            proposal.status = ProposalStatus::Shortlisted;
            proposal.shortlisted_at = Some(Utc::now());
            proposal.updated_at = Utc::now();
            Ok(())
        }
        from => Err(ProposalError::IllegalTransition { from }),
    }
}

/// Accept one proposal and retire all its rivals.
///
/// Checks run before any mutation, so a failure leaves posting and
/// proposals untouched. On success: the chosen proposal is `accepted`, the
/// posting is `assigned` to its expert, every other pending/shortlisted
/// proposal is `rejected`, and a fresh engagement seeded from the bid is
/// returned. If the posting already left its award window (another accept
/// won the race), the caller observes `AlreadyAssigned`.
pub fn accept_proposal(
    posting: &mut Posting,
    proposals: &mut [Proposal],
    proposal_id: &ProposalId,
    actor: &ActorContext,
) -> Result<Award, ProposalError> {
    require_owner(posting, actor)?;
    if !posting.status.accepts_award() {
        return Err(ProposalError::AlreadyAssigned);
    }

    let winner_idx = proposals
        .iter()
        .position(|p| &p.id == proposal_id)
        .ok_or(ProposalError::PostingMismatch)?;
    if proposals[winner_idx].posting_id != posting.id {
        return Err(ProposalError::PostingMismatch);
    }
    if !proposals[winner_idx].status.is_in_play() {
        return Err(ProposalError::IllegalTransition {
            from: proposals[winner_idx].status,
        });
    }

    let now = Utc::now();
    for (idx, proposal) in proposals.iter_mut().enumerate() {
        if idx == winner_idx {
            proposal.status = ProposalStatus::Accepted;
            proposal.accepted_at = Some(now);
            proposal.updated_at = now;
        } else if proposal.status.is_in_play() {
            proposal.status = ProposalStatus::Rejected;
            proposal.rejected_at = Some(now);
            proposal.rejection_reason = Some("another proposal was accepted".into());
            proposal.updated_at = now;
        }
    }

    let winner = &proposals[winner_idx];
    posting.status = PostingStatus::Assigned;
    posting.assigned_expert_id = Some(winner.expert_id);
    posting.assigned_at = Some(now);
    posting.updated_at = now;

    let engagement = Engagement::accepted(
        posting.client_id,
        winner.expert_id,
        EngagementOrigin::Posting {
            posting_id: posting.id,
            proposal_id: winner.id,
        },
        posting.title.clone(),
        winner.proposed_price,
        winner.currency,
        DEFAULT_REVISIONS,
        posting.deadline,
    );

    tracing::info!(
        posting_id = %posting.id,
        proposal_id = %winner.id,
        engagement_id = %engagement.id,
        "accepted proposal"
    );

    Ok(Award {
        proposal_id: winner.id,
        engagement,
    })
}

/// Reject a live proposal with an optional reason.
pub fn reject_proposal(
    posting: &Posting,
    proposal: &mut Proposal,
    actor: &ActorContext,
    reason: Option<String>,
) -> Result<(), ProposalError> {
    require_owner(posting, actor)?;
    require_same_posting(posting, proposal)?;

    if !proposal.status.is_in_play() {
        return Err(ProposalError::IllegalTransition {
            from: proposal.status,
        });
    }
    proposal.status = ProposalStatus::Rejected;
    proposal.rejected_at = Some(Utc::now());
    proposal.rejection_reason = reason;
    proposal.updated_at = Utc::now();
    Ok(())
}

/// Withdraw a live proposal. Author-only.
pub fn withdraw_proposal(
    proposal: &mut Proposal,
    actor: &ActorContext,
) -> Result<(), ProposalError> {
    if !actor.is(&proposal.expert_id) {
        return Err(ProposalError::NotAuthor);
    }
    if !proposal.status.is_in_play() {
        return Err(ProposalError::IllegalTransition {
            from: proposal.status,
        });
    }
    proposal.status = ProposalStatus::Withdrawn;
    proposal.withdrawn_at = Some(Utc::now());
    proposal.updated_at = Utc::now();
    Ok(())
}

fn require_owner(posting: &Posting, actor: &ActorContext) -> Result<(), ProposalError> {
    if actor.is(&posting.client_id) {
        Ok(())
    } else {
        Err(ProposalError::NotOwner)
    }
}

fn require_same_posting(posting: &Posting, proposal: &Proposal) -> Result<(), ProposalError> {
    if proposal.posting_id == posting.id {
        Ok(())
    } else {
        Err(ProposalError::PostingMismatch)
    }
}
