//! Mock gateway for development and tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;
use werkmarkt_types::{
    CheckoutSession, Currency, Engagement, Payout, PayoutId, PayoutStatus, SessionId, UserId,
};

use crate::{GatewayEvent, PaymentError, PaymentGateway};

/// In-process stand-in for the external escrow gateway.
///
/// Sessions are held in memory; tests settle or fail them explicitly and
/// feed the resulting [`GatewayEvent`] into the webhook path.
#[derive(Debug, Default)]
pub struct MockGateway {
    sessions: RwLock<HashMap<SessionId, CheckoutSession>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the customer completing checkout.
    pub async fn settle(&self, session_id: &SessionId) -> Result<GatewayEvent, PaymentError> {
        let sessions = self.sessions.read().await;
        if !sessions.contains_key(session_id) {
            return Err(PaymentError::UnknownSession(session_id.to_string()));
        }
        Ok(GatewayEvent::CheckoutCompleted {
            session_id: session_id.clone(),
        })
    }

    /// Simulate a failed or abandoned checkout.
    pub async fn fail(
        &self,
        session_id: &SessionId,
        reason: impl Into<String>,
    ) -> Result<GatewayEvent, PaymentError> {
        let sessions = self.sessions.read().await;
        if !sessions.contains_key(session_id) {
            return Err(PaymentError::UnknownSession(session_id.to_string()));
        }
        Ok(GatewayEvent::CheckoutFailed {
            session_id: session_id.clone(),
            reason: Some(reason.into()),
        })
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_checkout_session(
        &self,
        engagement: &Engagement,
    ) -> Result<CheckoutSession, PaymentError> {
        if engagement.price <= 0 {
            return Err(PaymentError::Validation(
                "checkout amount must be positive".into(),
            ));
        }

        let session_id = SessionId::new(format!("cs_{}", Uuid::new_v4().simple()));
        let session = CheckoutSession {
            session_id: session_id.clone(),
            engagement_id: engagement.id,
            amount: engagement.price,
            currency: engagement.currency,
            redirect_url: format!("https://pay.werkmarkt.test/checkout/{}", session_id),
            created_at: Utc::now(),
        };

        self.sessions
            .write()
            .await
            .insert(session_id, session.clone());

        tracing::debug!(
            session_id = %session.session_id,
            engagement_id = %engagement.id,
            amount = engagement.price,
            "created mock checkout session"
        );
        Ok(session)
    }

    async fn request_payout(
        &self,
        expert_id: &UserId,
        amount: i64,
        currency: Currency,
    ) -> Result<Payout, PaymentError> {
        if amount <= 0 {
            return Err(PaymentError::Validation(
                "payout amount must be positive".into(),
            ));
        }
        let now = Utc::now();
        Ok(Payout {
            id: PayoutId::generate(),
            expert_id: *expert_id,
            amount,
            currency,
            status: PayoutStatus::Pending,
            failure_reason: None,
            arrival_date: None,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use werkmarkt_types::{EngagementOrigin, RevisionPolicy};

    fn engagement(price: i64) -> Engagement {
        Engagement::accepted(
            UserId::generate(),
            UserId::generate(),
            EngagementOrigin::Direct,
            "test",
            price,
            Currency::Chf,
            RevisionPolicy::Bounded(2),
            None,
        )
    }

    #[tokio::test]
    async fn session_round_trip() {
        let gateway = MockGateway::new();
        let engagement = engagement(250_000);

        let session = gateway.create_checkout_session(&engagement).await.unwrap();
        assert_eq!(session.engagement_id, engagement.id);
        assert_eq!(session.amount, 250_000);
        assert!(session.redirect_url.contains(session.session_id.as_str()));

        let event = gateway.settle(&session.session_id).await.unwrap();
        assert!(matches!(event, GatewayEvent::CheckoutCompleted { .. }));
    }

    #[tokio::test]
    async fn unknown_session_is_rejected() {
        let gateway = MockGateway::new();
        let err = gateway
            .settle(&SessionId::new("cs_missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::UnknownSession(_)));
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts() {
        let gateway = MockGateway::new();
        assert!(matches!(
            gateway.create_checkout_session(&engagement(0)).await,
            Err(PaymentError::Validation(_))
        ));
        assert!(matches!(
            gateway
                .request_payout(&UserId::generate(), -5, Currency::Eur)
                .await,
            Err(PaymentError::Validation(_))
        ));
    }

    #[test]
    fn webhook_events_deserialize() {
        let event: GatewayEvent = serde_json::from_str(
            r#"{"type":"checkout.completed","session_id":"cs_abc"}"#,
        )
        .unwrap();
        assert!(matches!(event, GatewayEvent::CheckoutCompleted { .. }));

        let event: GatewayEvent = serde_json::from_str(
            r#"{"type":"checkout.failed","session_id":"cs_abc","reason":"card_declined"}"#,
        )
        .unwrap();
        assert!(matches!(
            event,
            GatewayEvent::CheckoutFailed { reason: Some(_), .. }
        ));
    }
}
