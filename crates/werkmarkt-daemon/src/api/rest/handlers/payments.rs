//! Payment bridge handlers

use crate::api::rest::extract::Caller;
use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult, StorageError};
use crate::storage::{EngagementStorage, PaymentStorage};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use werkmarkt_engagement::LifecycleError;
use werkmarkt_payments::GatewayEvent;
use werkmarkt_types::{
    ApiEnvelope, CheckoutSession, Currency, EngagementId, PageParams, Paginated, Payment,
    PaymentId, PaymentStatus, Payout,
};

/// Checkout request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub engagement_id: Uuid,
}

/// Open a checkout session for an engagement and record the pending
/// payment. The charge itself settles later via webhook.
pub async fn create_checkout(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<CheckoutSession>>)> {
    let engagement_id = EngagementId::from_uuid(request.engagement_id);
    let engagement = state
        .storage
        .get_engagement(&engagement_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Engagement {} not found", engagement_id)))?;

    if !actor.is(&engagement.client_id) {
        return Err(StorageError::Lifecycle(LifecycleError::NotEligible(
            "only the client funds the engagement".into(),
        ))
        .into());
    }

    let session = state
        .gateway
        .create_checkout_session(&engagement)
        .await
        .map_err(StorageError::from)?;

    let now = Utc::now();
    let payment = Payment {
        id: PaymentId::generate(),
        engagement_id: engagement.id,
        payer_id: engagement.client_id,
        payee_id: engagement.expert_id,
        amount: engagement.price,
        currency: engagement.currency,
        status: PaymentStatus::Pending,
        session_id: Some(session.session_id.clone()),
        failure_reason: None,
        paid_at: None,
        refunded_at: None,
        created_at: now,
        updated_at: now,
    };
    state.storage.insert_payment(payment).await?;

    tracing::info!(
        engagement_id = %engagement.id,
        session_id = %session.session_id,
        amount = session.amount,
        "opened checkout session"
    );
    Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(session))))
}

/// Fetch one payment record
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<Payment>>> {
    let id = PaymentId::from_uuid(id);
    let payment = state
        .storage
        .get_payment(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Payment {} not found", id)))?;
    Ok(Json(ApiEnvelope::ok(payment)))
}

/// Gateway webhook: settles or fails the payment and drives the matching
/// engagement transition. Safe to redeliver.
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(event): Json<GatewayEvent>,
) -> ApiResult<Json<ApiEnvelope<Payment>>> {
    let payment = state.storage.settle_checkout(event).await?;

    tracing::info!(
        payment_id = %payment.id,
        status = ?payment.status,
        "processed gateway webhook"
    );
    Ok(Json(ApiEnvelope::ok(payment)))
}

/// Payout request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequest {
    pub amount: i64,
    pub currency: Currency,
}

/// Expert requests a payout of accumulated earnings
pub async fn request_payout(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Json(request): Json<PayoutRequest>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<Payout>>)> {
    let payout = state
        .gateway
        .request_payout(&actor.user_id, request.amount, request.currency)
        .await
        .map_err(StorageError::from)?;
    state.storage.insert_payout(payout.clone()).await?;

    tracing::info!(
        payout_id = %payout.id,
        expert_id = %payout.expert_id,
        amount = payout.amount,
        "requested payout"
    );
    Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(payout))))
}

/// List the caller's payout requests
pub async fn list_payouts(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<Paginated<Payout>>> {
    let payouts = state
        .storage
        .list_payouts_for_expert(&actor.user_id)
        .await?;
    Ok(Json(page.slice(payouts)))
}
