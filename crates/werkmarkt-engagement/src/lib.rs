//! Werkmarkt Engagement - the lifecycle state machine
//!
//! Once a proposal or booking is accepted, the engagement carries the paid
//! work through payment, delivery, the revision loop, and completion (or
//! cancellation, dispute, refund). Every mutation of an engagement passes
//! through [`transition`]; there is no other write path.
//!
//! The machine is deliberately all-or-nothing: a rejected event leaves the
//! engagement exactly as it was, including the revision counter.

pub mod event;
pub mod ledger;
mod machine;

use thiserror::Error;
use werkmarkt_types::{EngagementStatus, PaymentStatus};

pub use event::{DisputeOutcome, EngagementEvent};
pub use ledger::can_request_revision;
pub use machine::transition;

/// Lifecycle guard failures
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The (state, event) pair is not in the transition table
    #[error("Illegal transition: {event} is not legal from {from:?}")]
    IllegalTransition {
        from: EngagementStatus,
        event: &'static str,
    },

    /// The revision allowance is exhausted; accept or dispute instead
    #[error("Revision limit exceeded ({allowed} allowed)")]
    RevisionLimitExceeded { allowed: u16 },

    /// The acting user may not drive this event
    #[error("Not eligible: {0}")]
    NotEligible(String),

    /// The payment record gating `mark_paid` has not actually settled
    #[error("Payment has not succeeded (status {status:?})")]
    PaymentNotSettled { status: PaymentStatus },

    /// The payment record belongs to a different engagement
    #[error("Payment record does not match this engagement")]
    PaymentMismatch,
}
