//! Posting catalog handlers

use crate::api::rest::extract::Caller;
use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::storage::PostingStorage;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use werkmarkt_catalog::{PostingDraft, PostingUpdate};
use werkmarkt_types::{
    ApiEnvelope, PageParams, Paginated, Posting, PostingId, PostingStatus,
};

/// Posting list filters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingFilter {
    #[serde(default)]
    pub status: Option<PostingStatus>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
}

/// List postings, filtered and paginated. Drafts only surface when the
/// owner filters by their own client id.
pub async fn list_postings(
    State(state): State<AppState>,
    Query(filter): Query<PostingFilter>,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<Paginated<Posting>>> {
    let client_id = filter.client_id.map(werkmarkt_types::UserId::from_uuid);
    let postings: Vec<Posting> = state
        .storage
        .list_postings()
        .await?
        .into_iter()
        .filter(|p| filter.status.map_or(true, |s| p.status == s))
        .filter(|p| client_id.map_or(true, |c| p.client_id == c))
        .filter(|p| client_id.is_some() || p.status != PostingStatus::Draft)
        .collect();

    Ok(Json(page.slice(postings)))
}

/// Create a posting owned by the calling client
pub async fn create_posting(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Json(draft): Json<PostingDraft>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<Posting>>)> {
    let posting = werkmarkt_catalog::create_posting(&actor, draft)
        .map_err(crate::error::StorageError::from)?;
    state.storage.insert_posting(posting.clone()).await?;

    tracing::info!(posting_id = %posting.id, client_id = %posting.client_id, "created posting");
    Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(posting))))
}

/// Fetch one posting, bumping its view counter
pub async fn get_posting(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<Posting>>> {
    let id = PostingId::from_uuid(id);
    state.storage.record_posting_view(&id).await?;
    let posting = state
        .storage
        .get_posting(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Posting {} not found", id)))?;
    Ok(Json(ApiEnvelope::ok(posting)))
}

/// Apply owner edits to a draft/open posting
pub async fn update_posting(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    Json(update): Json<PostingUpdate>,
) -> ApiResult<Json<ApiEnvelope<Posting>>> {
    let posting = state
        .storage
        .update_posting(&PostingId::from_uuid(id), &actor, update)
        .await?;
    Ok(Json(ApiEnvelope::ok(posting)))
}

/// Publish a draft posting
pub async fn open_posting(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<Posting>>> {
    let posting = state
        .storage
        .open_posting(&PostingId::from_uuid(id), &actor)
        .await?;
    Ok(Json(ApiEnvelope::ok(posting)))
}

/// Close posting request body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePostingRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Close a posting without a hire
pub async fn close_posting(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<ClosePostingRequest>,
) -> ApiResult<Json<ApiEnvelope<Posting>>> {
    let posting = state
        .storage
        .close_posting(&PostingId::from_uuid(id), &actor, request.reason)
        .await?;
    Ok(Json(ApiEnvelope::with_message(posting, "posting closed")))
}

/// Retire a posting; the DELETE verb maps onto the close transition
/// without a recorded reason.
pub async fn delete_posting(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<Posting>>> {
    let posting = state
        .storage
        .close_posting(&PostingId::from_uuid(id), &actor, None)
        .await?;
    Ok(Json(ApiEnvelope::with_message(posting, "posting closed")))
}
