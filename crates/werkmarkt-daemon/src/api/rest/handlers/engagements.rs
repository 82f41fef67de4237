//! Engagement lifecycle handlers ("projects" on the wire)

use crate::api::rest::extract::Caller;
use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::storage::EngagementStorage;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use werkmarkt_engagement::{DisputeOutcome, EngagementEvent};
use werkmarkt_types::{ApiEnvelope, Engagement, EngagementId, PageParams, Paginated};

/// List the caller's engagements (both sides)
pub async fn list_engagements(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<Paginated<Engagement>>> {
    let engagements = state
        .storage
        .list_engagements_for_user(&actor.user_id)
        .await?;
    Ok(Json(page.slice(engagements)))
}

/// Fetch one engagement; participants and the platform only
pub async fn get_engagement(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<Engagement>>> {
    let id = EngagementId::from_uuid(id);
    let engagement = state
        .storage
        .get_engagement(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Engagement {} not found", id)))?;

    if !engagement.participant(&actor.user_id) && !actor.is_system() {
        return Err(ApiError::NotFound(format!("Engagement {} not found", id)));
    }
    Ok(Json(ApiEnvelope::ok(engagement)))
}

/// Assigned expert begins work
pub async fn start_work(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<Engagement>>> {
    apply(&state, id, &actor, EngagementEvent::StartWork).await
}

/// Delivery request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverRequest {
    pub message: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// Expert hands over a delivery
pub async fn deliver(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<DeliverRequest>,
) -> ApiResult<Json<ApiEnvelope<Engagement>>> {
    apply(
        &state,
        id,
        &actor,
        EngagementEvent::Deliver {
            message: request.message,
            attachments: request.attachments,
        },
    )
    .await
}

/// Reason-carrying request body (revision, dispute, cancel)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonRequest {
    pub reason: String,
}

/// Client sends the delivery back for rework
pub async fn request_revision(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<ReasonRequest>,
) -> ApiResult<Json<ApiEnvelope<Engagement>>> {
    apply(
        &state,
        id,
        &actor,
        EngagementEvent::RequestRevision {
            reason: request.reason,
        },
    )
    .await
}

/// Client approves the delivery
pub async fn complete(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<Engagement>>> {
    apply(&state, id, &actor, EngagementEvent::AcceptDelivery).await
}

/// Either participant escalates to platform arbitration
pub async fn open_dispute(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<ReasonRequest>,
) -> ApiResult<Json<ApiEnvelope<Engagement>>> {
    apply(
        &state,
        id,
        &actor,
        EngagementEvent::OpenDispute {
            reason: request.reason,
        },
    )
    .await
}

/// Abort the engagement before work is underway
pub async fn cancel(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<ReasonRequest>,
) -> ApiResult<Json<ApiEnvelope<Engagement>>> {
    apply(
        &state,
        id,
        &actor,
        EngagementEvent::Cancel {
            reason: request.reason,
        },
    )
    .await
}

/// Dispute resolution request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub outcome: DisputeOutcome,
}

/// Platform arbitration settles a dispute
pub async fn resolve_dispute(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveRequest>,
) -> ApiResult<Json<ApiEnvelope<Engagement>>> {
    apply(
        &state,
        id,
        &actor,
        EngagementEvent::Resolve {
            outcome: request.outcome,
        },
    )
    .await
}

async fn apply(
    state: &AppState,
    id: Uuid,
    actor: &werkmarkt_types::ActorContext,
    event: EngagementEvent,
) -> ApiResult<Json<ApiEnvelope<Engagement>>> {
    let engagement = state
        .storage
        .transition_engagement(&EngagementId::from_uuid(id), actor, event)
        .await?;
    Ok(Json(ApiEnvelope::ok(engagement)))
}
