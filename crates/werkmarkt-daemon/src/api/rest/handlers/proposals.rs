//! Proposal handlers

use crate::api::rest::extract::Caller;
use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use crate::storage::ProposalStorage;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use werkmarkt_types::{
    ApiEnvelope, Engagement, PageParams, Paginated, PostingId, Proposal, ProposalBid, ProposalId,
};

/// List proposals submitted against a posting
pub async fn list_proposals(
    State(state): State<AppState>,
    Path(posting_id): Path<Uuid>,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<Paginated<Proposal>>> {
    let proposals = state
        .storage
        .list_proposals_for_posting(&PostingId::from_uuid(posting_id))
        .await?;
    Ok(Json(page.slice(proposals)))
}

/// Submit a bid against an open posting
pub async fn submit_proposal(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(posting_id): Path<Uuid>,
    Json(bid): Json<ProposalBid>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<Proposal>>)> {
    let proposal = state
        .storage
        .submit_proposal(&PostingId::from_uuid(posting_id), &actor, bid)
        .await?;

    tracing::info!(
        proposal_id = %proposal.id,
        posting_id = %proposal.posting_id,
        expert_id = %proposal.expert_id,
        "submitted proposal"
    );
    Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(proposal))))
}

/// Accept a proposal, assigning the posting and minting the engagement
pub async fn accept_proposal(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<Engagement>>)> {
    let engagement = state
        .storage
        .accept_proposal(&ProposalId::from_uuid(id), &actor)
        .await?;

    tracing::info!(
        engagement_id = %engagement.id,
        expert_id = %engagement.expert_id,
        "accepted proposal"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::with_message(engagement, "proposal accepted")),
    ))
}

/// Shortlist a pending proposal
pub async fn shortlist_proposal(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<Proposal>>> {
    let proposal = state
        .storage
        .shortlist_proposal(&ProposalId::from_uuid(id), &actor)
        .await?;
    Ok(Json(ApiEnvelope::ok(proposal)))
}

/// Reject proposal request body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectProposalRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Reject a live proposal
pub async fn reject_proposal(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectProposalRequest>,
) -> ApiResult<Json<ApiEnvelope<Proposal>>> {
    let proposal = state
        .storage
        .reject_proposal(&ProposalId::from_uuid(id), &actor, request.reason)
        .await?;
    Ok(Json(ApiEnvelope::ok(proposal)))
}

/// Withdraw a live proposal (bidding expert only)
pub async fn withdraw_proposal(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<Proposal>>> {
    let proposal = state
        .storage
        .withdraw_proposal(&ProposalId::from_uuid(id), &actor)
        .await?;
    Ok(Json(ApiEnvelope::ok(proposal)))
}
