//! Health and status handlers

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use crate::storage::{EngagementStorage, PostingStorage};
use axum::{extract::State, Json};
use serde::Serialize;
use werkmarkt_types::{EngagementStatus, PostingStatus};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
    })
}

/// Daemon status response
#[derive(Debug, Serialize)]
pub struct DaemonStatusResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub stats: DaemonStats,
}

/// Marketplace statistics
#[derive(Debug, Serialize)]
pub struct DaemonStats {
    pub total_postings: usize,
    pub open_postings: usize,
    pub total_engagements: usize,
    pub active_engagements: usize,
}

/// Daemon status endpoint
pub async fn daemon_status(State(state): State<AppState>) -> ApiResult<Json<DaemonStatusResponse>> {
    let postings = state.storage.list_postings().await?;
    let open = postings
        .iter()
        .filter(|p| p.status == PostingStatus::Open)
        .count();

    let engagements = state.storage.list_engagements().await?;
    let active = engagements
        .iter()
        .filter(|e| !e.status.is_terminal() && e.status != EngagementStatus::Pending)
        .count();

    Ok(Json(DaemonStatusResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
        started_at: state.started_at,
        stats: DaemonStats {
            total_postings: postings.len(),
            open_postings: open,
            total_engagements: engagements.len(),
            active_engagements: active,
        },
    }))
}
