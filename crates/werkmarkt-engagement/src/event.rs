//! Events that drive the engagement state machine

use serde::Deserialize;
use werkmarkt_types::Payment;

/// Arbitration outcome for a disputed engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeOutcome {
    /// Work stands; the engagement completes and the expert is paid
    Complete,
    /// Client is refunded; the engagement ends refunded
    Refund,
}

/// One step of the engagement lifecycle
#[derive(Debug, Clone)]
pub enum EngagementEvent {
    /// Escrow reports the charge settled (webhook-driven, may arrive twice)
    MarkPaid { payment: Payment },
    /// Assigned expert begins work
    StartWork,
    /// Assigned expert hands over a delivery
    Deliver {
        message: String,
        attachments: Vec<String>,
    },
    /// Client sends the delivery back for rework
    RequestRevision { reason: String },
    /// Client approves the delivery
    AcceptDelivery,
    /// Either participant escalates to platform arbitration
    OpenDispute { reason: String },
    /// Client (or the platform, on payment failure) aborts the engagement
    Cancel { reason: String },
    /// Platform arbitration settles a dispute
    Resolve { outcome: DisputeOutcome },
}

impl EngagementEvent {
    /// Stable name used in error reporting and logs.
    pub fn name(&self) -> &'static str {
        match self {
            EngagementEvent::MarkPaid { .. } => "mark_paid",
            EngagementEvent::StartWork => "start_work",
            EngagementEvent::Deliver { .. } => "deliver",
            EngagementEvent::RequestRevision { .. } => "request_revision",
            EngagementEvent::AcceptDelivery => "accept_delivery",
            EngagementEvent::OpenDispute { .. } => "open_dispute",
            EngagementEvent::Cancel { .. } => "cancel",
            EngagementEvent::Resolve { .. } => "resolve",
        }
    }
}
