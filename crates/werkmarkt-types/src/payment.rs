//! Payment ledger mirrors of the external escrow gateway

use crate::{Currency, EngagementId, PaymentId, PayoutId, SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gateway-side charge status, mirrored per engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Refunded,
    Disputed,
}

/// One engagement's charge as the gateway reports it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub engagement_id: EngagementId,
    pub payer_id: UserId,
    pub payee_id: UserId,
    pub amount: i64,
    pub currency: Currency,
    pub status: PaymentStatus,
    pub session_id: Option<SessionId>,
    pub failure_reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payout processing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    InTransit,
    Paid,
    Failed,
}

/// A transfer of accumulated earnings to an expert
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: PayoutId,
    pub expert_id: UserId,
    pub amount: i64,
    pub currency: Currency,
    pub status: PayoutStatus,
    pub failure_reason: Option<String>,
    pub arrival_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The gateway's representation of a pending charge for one engagement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: SessionId,
    pub engagement_id: EngagementId,
    pub amount: i64,
    pub currency: Currency,
    pub redirect_url: String,
    pub created_at: DateTime<Utc>,
}
