//! The gateway trait and its webhook event shapes

use async_trait::async_trait;
use serde::Deserialize;
use werkmarkt_types::{CheckoutSession, Currency, Engagement, Payout, SessionId, UserId};

use crate::PaymentError;

/// Notifications the gateway posts back to the platform.
///
/// Delivery is at-least-once; consumers must tolerate duplicates.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// The charge behind a checkout session settled
    #[serde(rename = "checkout.completed")]
    CheckoutCompleted { session_id: SessionId },
    /// The charge failed or the customer abandoned checkout
    #[serde(rename = "checkout.failed")]
    CheckoutFailed {
        session_id: SessionId,
        #[serde(default)]
        reason: Option<String>,
    },
}

/// The external escrow/payment collaborator.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout session holding the engagement's price in escrow.
    async fn create_checkout_session(
        &self,
        engagement: &Engagement,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Transfer accumulated earnings to an expert.
    async fn request_payout(
        &self,
        expert_id: &UserId,
        amount: i64,
        currency: Currency,
    ) -> Result<Payout, PaymentError>;
}
