//! Conformance tests for the storage coordination layer
//!
//! These exercise the atomic check-and-mutate methods the REST handlers
//! delegate to, including the racy paths two HTTP callers could hit.

use chrono::Utc;
use std::sync::Arc;
use werkmarkt_daemon::error::StorageError;
use werkmarkt_daemon::storage::{
    BookingStorage, EngagementStorage, PaymentStorage, PostingStorage, ProposalStorage,
    ReviewStorage,
};
use werkmarkt_daemon::InMemoryStorage;
use werkmarkt_engagement::{EngagementEvent, LifecycleError};
use werkmarkt_payments::GatewayEvent;
use werkmarkt_proposals::{BookingDraft, BookingResponse, ProposalError};
use werkmarkt_reviews::ReviewError;
use werkmarkt_types::{
    ActorContext, ActorRole, BudgetType, Currency, Engagement, EngagementStatus, Payment,
    PaymentId, PaymentStatus, Posting, PostingStatus, ProposalBid, ProposalStatus, ReviewPayload,
    SessionId, UserId,
};

fn client() -> ActorContext {
    ActorContext::new(UserId::generate(), ActorRole::Client)
}

fn expert() -> ActorContext {
    ActorContext::new(UserId::generate(), ActorRole::Expert)
}

fn posting_draft() -> werkmarkt_catalog::PostingDraft {
    werkmarkt_catalog::PostingDraft {
        title: "Rebuild our booking funnel".to_string(),
        description: "We need a full rebuild of the booking funnel, from the landing page \
                      through checkout, including analytics events."
            .to_string(),
        requirements: None,
        category_id: Some("web-development".to_string()),
        skills_required: vec!["rust".to_string()],
        tools_required: vec![],
        budget_type: BudgetType::Fixed,
        budget_min: Some(250_000),
        budget_max: None,
        currency: Currency::Chf,
        deadline: None,
        estimated_duration: None,
        is_urgent: false,
        attachments: vec![],
        publish: true,
    }
}

fn bid(price: i64) -> ProposalBid {
    ProposalBid {
        cover_letter: "I have shipped three comparable funnels and can start immediately; \
                       references available on request."
            .to_string(),
        proposed_price: price,
        currency: Currency::Chf,
        proposed_duration: Some("3 weeks".to_string()),
        attachments: vec![],
    }
}

fn review_payload(rating: u8) -> ReviewPayload {
    ReviewPayload {
        rating,
        communication_rating: Some(rating),
        quality_rating: Some(rating),
        timeliness_rating: None,
        value_rating: None,
        title: None,
        content: "Delivered exactly what was asked for, on time.".to_string(),
        is_public: true,
    }
}

async fn open_posting(storage: &InMemoryStorage, owner: &ActorContext) -> Posting {
    let posting =
        werkmarkt_catalog::create_posting(owner, posting_draft()).expect("valid draft");
    assert_eq!(posting.status, PostingStatus::Open);
    storage.insert_posting(posting.clone()).await.unwrap();
    posting
}

/// Insert a pending payment for the engagement and return its session id.
async fn pending_payment(storage: &InMemoryStorage, engagement: &Engagement) -> SessionId {
    let session_id = SessionId::new(format!("cs_{}", engagement.id));
    let now = Utc::now();
    storage
        .insert_payment(Payment {
            id: PaymentId::generate(),
            engagement_id: engagement.id,
            payer_id: engagement.client_id,
            payee_id: engagement.expert_id,
            amount: engagement.price,
            currency: engagement.currency,
            status: PaymentStatus::Pending,
            session_id: Some(session_id.clone()),
            failure_reason: None,
            paid_at: None,
            refunded_at: None,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
    session_id
}

#[tokio::test]
async fn full_engagement_happy_path() {
    let storage = InMemoryStorage::new();
    let owner = client();
    let winner = expert();
    let runner_up = expert();

    let posting = open_posting(&storage, &owner).await;

    let winning = storage
        .submit_proposal(&posting.id, &winner, bid(250_000))
        .await
        .unwrap();
    storage
        .submit_proposal(&posting.id, &runner_up, bid(300_000))
        .await
        .unwrap();

    // Accept: posting assigned, rival rejected, engagement minted.
    let engagement = storage.accept_proposal(&winning.id, &owner).await.unwrap();
    assert_eq!(engagement.status, EngagementStatus::Accepted);
    assert_eq!(engagement.price, 250_000);
    assert_eq!(engagement.platform_fee + engagement.expert_payout, 250_000);
    assert_eq!(engagement.platform_fee, 25_000);

    let posting = storage.get_posting(&posting.id).await.unwrap().unwrap();
    assert_eq!(posting.status, PostingStatus::Assigned);
    assert_eq!(posting.assigned_expert_id, Some(winner.user_id));
    assert!(posting.assignment_consistent());

    let proposals = storage
        .list_proposals_for_posting(&posting.id)
        .await
        .unwrap();
    let accepted = proposals
        .iter()
        .filter(|p| p.status == ProposalStatus::Accepted)
        .count();
    let rejected = proposals
        .iter()
        .filter(|p| p.status == ProposalStatus::Rejected)
        .count();
    assert_eq!((accepted, rejected), (1, 1));

    // Pay via webhook.
    let session_id = pending_payment(&storage, &engagement).await;
    storage
        .settle_checkout(GatewayEvent::CheckoutCompleted {
            session_id: session_id.clone(),
        })
        .await
        .unwrap();
    let engagement = storage
        .get_engagement(&engagement.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(engagement.status, EngagementStatus::Paid);

    // Work, deliver, one revision, deliver again, complete.
    storage
        .transition_engagement(&engagement.id, &winner, EngagementEvent::StartWork)
        .await
        .unwrap();
    storage
        .transition_engagement(
            &engagement.id,
            &winner,
            EngagementEvent::Deliver {
                message: "first cut".to_string(),
                attachments: vec![],
            },
        )
        .await
        .unwrap();
    let revised = storage
        .transition_engagement(
            &engagement.id,
            &owner,
            EngagementEvent::RequestRevision {
                reason: "checkout flow misses the coupon field".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(revised.status, EngagementStatus::Revision);
    assert_eq!(revised.revisions_used, 1);

    storage
        .transition_engagement(
            &engagement.id,
            &winner,
            EngagementEvent::Deliver {
                message: "coupon field added".to_string(),
                attachments: vec![],
            },
        )
        .await
        .unwrap();
    let done = storage
        .transition_engagement(&engagement.id, &owner, EngagementEvent::AcceptDelivery)
        .await
        .unwrap();
    assert_eq!(done.status, EngagementStatus::Completed);
    assert!(done.completed_at.is_some());

    // Both sides review; summary reflects the client's rating of the expert.
    storage
        .submit_review(&engagement.id, &owner, review_payload(5))
        .await
        .unwrap();
    storage
        .submit_review(&engagement.id, &winner, review_payload(4))
        .await
        .unwrap();

    let received = storage
        .list_reviews_for_reviewee(&winner.user_id)
        .await
        .unwrap();
    let summary = werkmarkt_reviews::summarize(&received);
    assert_eq!(summary.total_reviews, 1);
    assert_eq!(summary.average_rating, 5.0);
    assert_eq!(summary.rating_distribution.five_star, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accept_has_exactly_one_winner() {
    let storage = Arc::new(InMemoryStorage::new());
    let owner = client();
    let posting = open_posting(&storage, &owner).await;

    let first = storage
        .submit_proposal(&posting.id, &expert(), bid(200_000))
        .await
        .unwrap();
    let second = storage
        .submit_proposal(&posting.id, &expert(), bid(210_000))
        .await
        .unwrap();

    let a = {
        let storage = storage.clone();
        let id = first.id;
        tokio::spawn(async move { storage.accept_proposal(&id, &owner).await })
    };
    let b = {
        let storage = storage.clone();
        let id = second.id;
        tokio::spawn(async move { storage.accept_proposal(&id, &owner).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one accept must win");

    for result in results {
        if let Err(err) = result {
            assert!(matches!(
                err,
                StorageError::Proposal(ProposalError::AlreadyAssigned)
            ));
        }
    }

    let posting = storage.get_posting(&posting.id).await.unwrap().unwrap();
    assert_eq!(posting.status, PostingStatus::Assigned);
    assert!(posting.assignment_consistent());
    assert_eq!(storage.list_engagements().await.unwrap().len(), 1);
}

#[tokio::test]
async fn webhook_redelivery_is_a_no_op() {
    let storage = InMemoryStorage::new();
    let owner = client();
    let worker = expert();
    let posting = open_posting(&storage, &owner).await;
    let proposal = storage
        .submit_proposal(&posting.id, &worker, bid(100_000))
        .await
        .unwrap();
    let engagement = storage.accept_proposal(&proposal.id, &owner).await.unwrap();

    let session_id = pending_payment(&storage, &engagement).await;
    let event = GatewayEvent::CheckoutCompleted {
        session_id: session_id.clone(),
    };
    storage.settle_checkout(event.clone()).await.unwrap();
    storage
        .transition_engagement(&engagement.id, &worker, EngagementEvent::StartWork)
        .await
        .unwrap();

    // Redelivered success notification after work started: no state change.
    let payment = storage.settle_checkout(event.clone()).await.unwrap();
    assert_eq!(payment.status, PaymentStatus::Succeeded);
    let engagement = storage
        .get_engagement(&engagement.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(engagement.status, EngagementStatus::InProgress);

    // The gateway keeps retrying while a dispute is open; still a no-op.
    storage
        .transition_engagement(
            &engagement.id,
            &owner,
            EngagementEvent::OpenDispute {
                reason: "work stalled".to_string(),
            },
        )
        .await
        .unwrap();
    let payment = storage.settle_checkout(event).await.unwrap();
    assert_eq!(payment.status, PaymentStatus::Succeeded);
    let engagement = storage
        .get_engagement(&engagement.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(engagement.status, EngagementStatus::Disputed);
}

#[tokio::test]
async fn payment_failure_cancels_the_engagement() {
    let storage = InMemoryStorage::new();
    let owner = client();
    let posting = open_posting(&storage, &owner).await;
    let proposal = storage
        .submit_proposal(&posting.id, &expert(), bid(100_000))
        .await
        .unwrap();
    let engagement = storage.accept_proposal(&proposal.id, &owner).await.unwrap();

    let session_id = pending_payment(&storage, &engagement).await;
    let payment = storage
        .settle_checkout(GatewayEvent::CheckoutFailed {
            session_id,
            reason: Some("card_declined".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);
    assert_eq!(payment.failure_reason.as_deref(), Some("card_declined"));

    let engagement = storage
        .get_engagement(&engagement.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(engagement.status, EngagementStatus::Cancelled);
    assert_eq!(
        engagement.cancellation_reason.as_deref(),
        Some("payment_failed")
    );
}

#[tokio::test]
async fn duplicate_review_is_rejected_at_the_storage_layer() {
    let storage = InMemoryStorage::new();
    let owner = client();
    let worker = expert();
    let posting = open_posting(&storage, &owner).await;
    let proposal = storage
        .submit_proposal(&posting.id, &worker, bid(100_000))
        .await
        .unwrap();
    let engagement = storage.accept_proposal(&proposal.id, &owner).await.unwrap();

    let session_id = pending_payment(&storage, &engagement).await;
    storage
        .settle_checkout(GatewayEvent::CheckoutCompleted { session_id })
        .await
        .unwrap();
    storage
        .transition_engagement(&engagement.id, &worker, EngagementEvent::StartWork)
        .await
        .unwrap();
    storage
        .transition_engagement(
            &engagement.id,
            &worker,
            EngagementEvent::Deliver {
                message: "done".to_string(),
                attachments: vec![],
            },
        )
        .await
        .unwrap();
    storage
        .transition_engagement(&engagement.id, &owner, EngagementEvent::AcceptDelivery)
        .await
        .unwrap();

    storage
        .submit_review(&engagement.id, &owner, review_payload(5))
        .await
        .unwrap();
    let err = storage
        .submit_review(&engagement.id, &owner, review_payload(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Review(ReviewError::DuplicateReview)
    ));
}

#[tokio::test]
async fn revision_allowance_is_bounded() {
    let storage = InMemoryStorage::new();
    let owner = client();
    let worker = expert();
    let posting = open_posting(&storage, &owner).await;
    let proposal = storage
        .submit_proposal(&posting.id, &worker, bid(100_000))
        .await
        .unwrap();
    let engagement = storage.accept_proposal(&proposal.id, &owner).await.unwrap();

    let session_id = pending_payment(&storage, &engagement).await;
    storage
        .settle_checkout(GatewayEvent::CheckoutCompleted { session_id })
        .await
        .unwrap();
    storage
        .transition_engagement(&engagement.id, &worker, EngagementEvent::StartWork)
        .await
        .unwrap();

    // Two revisions are allowed by default; the third is refused.
    for round in 0..2u16 {
        storage
            .transition_engagement(
                &engagement.id,
                &worker,
                EngagementEvent::Deliver {
                    message: format!("round {}", round),
                    attachments: vec![],
                },
            )
            .await
            .unwrap();
        let state = storage
            .transition_engagement(
                &engagement.id,
                &owner,
                EngagementEvent::RequestRevision {
                    reason: "not quite".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(state.revisions_used, round + 1);
    }

    storage
        .transition_engagement(
            &engagement.id,
            &worker,
            EngagementEvent::Deliver {
                message: "final".to_string(),
                attachments: vec![],
            },
        )
        .await
        .unwrap();
    let err = storage
        .transition_engagement(
            &engagement.id,
            &owner,
            EngagementEvent::RequestRevision {
                reason: "one more".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Lifecycle(LifecycleError::RevisionLimitExceeded { allowed: 2 })
    ));

    // The refusal changed nothing.
    let engagement = storage
        .get_engagement(&engagement.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(engagement.status, EngagementStatus::Delivered);
    assert_eq!(engagement.revisions_used, 2);
}

#[tokio::test]
async fn closed_posting_refuses_proposals() {
    let storage = InMemoryStorage::new();
    let owner = client();
    let posting = open_posting(&storage, &owner).await;

    storage
        .close_posting(&posting.id, &owner, Some("budget cut".to_string()))
        .await
        .unwrap();

    let err = storage
        .submit_proposal(&posting.id, &expert(), bid(100_000))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Proposal(ProposalError::PostingClosed { .. })
    ));

    let posting = storage.get_posting(&posting.id).await.unwrap().unwrap();
    assert_eq!(posting.status, PostingStatus::Cancelled);
    assert!(posting.assignment_consistent());
}

#[tokio::test]
async fn booking_acceptance_mints_an_engagement() {
    let storage = InMemoryStorage::new();
    let buyer = client();
    let seller = expert();

    let booking = storage
        .submit_booking(
            &buyer,
            BookingDraft {
                expert_id: seller.user_id,
                service_id: None,
                message: "Need a one-week audit of our checkout flow, starting next Monday."
                    .to_string(),
                proposed_budget: Some(80_000),
                currency: Currency::Eur,
                proposed_start_date: None,
                proposed_deadline: None,
            },
        )
        .await
        .unwrap();

    let (booking, engagement) = storage
        .respond_booking(
            &booking.id,
            &seller,
            BookingResponse {
                accept: true,
                message: Some("Happy to take this on.".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(booking.status, werkmarkt_types::BookingStatus::Accepted);
    let engagement = engagement.expect("acceptance mints an engagement");
    assert_eq!(engagement.client_id, buyer.user_id);
    assert_eq!(engagement.expert_id, seller.user_id);
    assert_eq!(engagement.price, 80_000);
    assert_eq!(engagement.currency, Currency::Eur);
    assert_eq!(engagement.status, EngagementStatus::Accepted);
}
