//! Werkmarkt Types - Core types for the marketplace lifecycle
//!
//! The marketplace connects clients who post work with experts who bid on
//! it. Everything here is the shared vocabulary of that exchange:
//!
//! - **Posting**: a client-authored request for work, open for expert bids
//! - **Proposal**: an expert's bid against a posting
//! - **BookingRequest**: a direct client-to-expert purchase negotiation
//! - **Engagement**: the paid unit of work created once a proposal or
//!   booking is accepted
//! - **Review**: a post-completion rating, gated to one per engagement per
//!   reviewer
//! - **Payment / Payout**: ledger mirrors of the external escrow gateway
//!
//! ## Architectural Boundaries
//!
//! - This crate owns: entity shapes, status enums, identifiers, the wire
//!   envelopes of the JSON contract
//! - The rule crates (`werkmarkt-catalog`, `werkmarkt-proposals`,
//!   `werkmarkt-engagement`, `werkmarkt-reviews`) own: which mutations are
//!   legal and when
//! - The daemon owns: atomicity of those mutations against storage

pub mod actor;
pub mod api;
pub mod booking;
pub mod engagement;
pub mod ids;
pub mod money;
pub mod payment;
pub mod posting;
pub mod proposal;
pub mod review;

// Re-export main types
pub use actor::{ActorContext, ActorRole};
pub use api::{ApiEnvelope, PageMeta, PageParams, Paginated};
pub use booking::{BookingRequest, BookingStatus};
pub use engagement::{Engagement, EngagementOrigin, EngagementStatus, RevisionPolicy};
pub use ids::{
    BookingId, EngagementId, PaymentId, PayoutId, PostingId, ProposalId, ReviewId, SessionId,
    UserId,
};
pub use money::{split_fee, Currency, PLATFORM_FEE_PERCENT};
pub use payment::{CheckoutSession, Payment, PaymentStatus, Payout, PayoutStatus};
pub use posting::{BudgetType, Posting, PostingStatus};
pub use proposal::{Proposal, ProposalBid, ProposalStatus};
pub use review::{RatingDistribution, Review, ReviewPayload, ReviewSummary};
