//! The transition function
//!
//! Implements the lifecycle table:
//!
//! | From | Event | To |
//! |---|---|---|
//! | pending/accepted | mark_paid | paid |
//! | paid | start_work | in_progress |
//! | in_progress, revision | deliver | delivered |
//! | delivered | request_revision | revision |
//! | delivered | accept_delivery | completed |
//! | paid/in_progress/delivered/revision | open_dispute | disputed |
//! | pending/accepted/paid | cancel | cancelled |
//! | disputed | resolve | completed or refunded |
//!
//! Everything else is an illegal transition. `completed`, `cancelled` and
//! `refunded` are terminal.

use chrono::Utc;
use werkmarkt_types::{
    ActorContext, Engagement, EngagementStatus, Payment, PaymentStatus, RevisionPolicy,
};

use crate::event::{DisputeOutcome, EngagementEvent};
use crate::ledger;
use crate::LifecycleError;

use EngagementStatus::*;

/// Apply one event to an engagement.
///
/// On `Err` the engagement is untouched; every guard runs before the first
/// mutation of its arm.
pub fn transition(
    engagement: &mut Engagement,
    actor: &ActorContext,
    event: EngagementEvent,
) -> Result<(), LifecycleError> {
    let from = engagement.status;
    let event_name = event.name();

    match (from, event) {
        (Pending | Accepted, EngagementEvent::MarkPaid { payment }) => {
            check_payment(engagement, &payment)?;
            engagement.status = Paid;
        }
        // Escrow webhooks may be redelivered; once the charge is applied a
        // repeat success notification is a no-op, whatever the work has
        // moved on to since (including a dispute or a refund).
        (
            Paid | InProgress | Delivered | Revision | Disputed | Completed | Refunded,
            EngagementEvent::MarkPaid { payment },
        ) => {
            check_payment(engagement, &payment)?;
            return Ok(());
        }

        (Paid, EngagementEvent::StartWork) => {
            require_expert(engagement, actor)?;
            engagement.status = InProgress;
        }

        (InProgress | Revision, EngagementEvent::Deliver { .. }) => {
            require_expert(engagement, actor)?;
            engagement.status = Delivered;
            engagement.delivered_at = Some(Utc::now());
        }

        (Delivered, EngagementEvent::RequestRevision { .. }) => {
            require_client(engagement, actor)?;
            if let RevisionPolicy::Bounded(allowed) = engagement.revisions_allowed {
                if !ledger::can_request_revision(engagement) {
                    return Err(LifecycleError::RevisionLimitExceeded { allowed });
                }
            }
            engagement.status = Revision;
            engagement.revisions_used += 1;
        }

        (Delivered, EngagementEvent::AcceptDelivery) => {
            require_client(engagement, actor)?;
            engagement.status = Completed;
            engagement.completed_at = Some(Utc::now());
        }

        (Paid | InProgress | Delivered | Revision, EngagementEvent::OpenDispute { reason }) => {
            require_participant(engagement, actor)?;
            engagement.status = Disputed;
            engagement.is_disputed = true;
            engagement.dispute_reason = Some(reason);
        }

        (Pending | Accepted | Paid, EngagementEvent::Cancel { reason }) => {
            if !(actor.is_system() || actor.is(&engagement.client_id)) {
                return Err(LifecycleError::NotEligible(
                    "only the client or the platform may cancel".into(),
                ));
            }
            engagement.status = Cancelled;
            engagement.cancelled_at = Some(Utc::now());
            engagement.cancellation_reason = Some(reason);
        }

        (Disputed, EngagementEvent::Resolve { outcome }) => {
            if !actor.is_system() {
                return Err(LifecycleError::NotEligible(
                    "dispute resolution is platform arbitration".into(),
                ));
            }
            match outcome {
                DisputeOutcome::Complete => {
                    engagement.status = Completed;
                    engagement.completed_at = Some(Utc::now());
                }
                DisputeOutcome::Refund => {
                    engagement.status = Refunded;
                }
            }
        }

        (from, _) => {
            return Err(LifecycleError::IllegalTransition {
                from,
                event: event_name,
            })
        }
    }

    engagement.updated_at = Utc::now();
    tracing::debug!(
        engagement_id = %engagement.id,
        from = ?from,
        to = ?engagement.status,
        event = event_name,
        "engagement transition"
    );
    Ok(())
}

fn check_payment(engagement: &Engagement, payment: &Payment) -> Result<(), LifecycleError> {
    if payment.engagement_id != engagement.id {
        return Err(LifecycleError::PaymentMismatch);
    }
    if payment.status != PaymentStatus::Succeeded {
        return Err(LifecycleError::PaymentNotSettled {
            status: payment.status,
        });
    }
    Ok(())
}

fn require_expert(engagement: &Engagement, actor: &ActorContext) -> Result<(), LifecycleError> {
    if actor.is(&engagement.expert_id) {
        Ok(())
    } else {
        Err(LifecycleError::NotEligible(
            "only the assigned expert may do this".into(),
        ))
    }
}

fn require_client(engagement: &Engagement, actor: &ActorContext) -> Result<(), LifecycleError> {
    if actor.is(&engagement.client_id) {
        Ok(())
    } else {
        Err(LifecycleError::NotEligible(
            "only the client may do this".into(),
        ))
    }
}

fn require_participant(engagement: &Engagement, actor: &ActorContext) -> Result<(), LifecycleError> {
    if engagement.participant(&actor.user_id) {
        Ok(())
    } else {
        Err(LifecycleError::NotEligible(
            "only engagement participants may do this".into(),
        ))
    }
}
