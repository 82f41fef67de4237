//! Error types for werkmarkt-daemon

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use werkmarkt_catalog::CatalogError;
use werkmarkt_engagement::LifecycleError;
use werkmarkt_payments::PaymentError;
use werkmarkt_proposals::{BookingError, ProposalError};
use werkmarkt_reviews::ReviewError;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the storage coordination layer.
///
/// The rule crates report every rejected transition; storage adds only the
/// lookup failures it can see itself.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Posting rule rejection
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Proposal rule rejection
    #[error(transparent)]
    Proposal(#[from] ProposalError),

    /// Booking rule rejection
    #[error(transparent)]
    Booking(#[from] BookingError),

    /// Engagement lifecycle rejection
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Review gate rejection
    #[error(transparent)]
    Review(#[from] ReviewError),

    /// Payment bridge failure
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (malformed ids, missing actor headers, ...)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Storage or rule rejection
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Map a storage rejection to its HTTP status and stable machine code.
fn storage_code(err: &StorageError) -> (StatusCode, &'static str) {
    match err {
        StorageError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),

        StorageError::Catalog(e) => match e {
            CatalogError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            CatalogError::IllegalTransition { .. } => (StatusCode::CONFLICT, "ILLEGAL_TRANSITION"),
            CatalogError::NotOwner => (StatusCode::FORBIDDEN, "NOT_ELIGIBLE"),
        },

        StorageError::Proposal(e) => match e {
            ProposalError::PostingClosed { .. } => (StatusCode::CONFLICT, "POSTING_CLOSED"),
            ProposalError::DuplicateProposal => (StatusCode::CONFLICT, "DUPLICATE_PROPOSAL"),
            ProposalError::AlreadyAssigned => (StatusCode::CONFLICT, "ALREADY_ASSIGNED"),
            ProposalError::IllegalTransition { .. } => {
                (StatusCode::CONFLICT, "ILLEGAL_TRANSITION")
            }
            ProposalError::PostingMismatch => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ProposalError::NotOwner | ProposalError::NotAuthor | ProposalError::NotEligible(_) => {
                (StatusCode::FORBIDDEN, "NOT_ELIGIBLE")
            }
            ProposalError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        },

        StorageError::Booking(e) => match e {
            BookingError::Expired => (StatusCode::CONFLICT, "BOOKING_EXPIRED"),
            BookingError::IllegalTransition { .. } => (StatusCode::CONFLICT, "ILLEGAL_TRANSITION"),
            BookingError::NotEligible(_) => (StatusCode::FORBIDDEN, "NOT_ELIGIBLE"),
            BookingError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        },

        StorageError::Lifecycle(e) => match e {
            LifecycleError::IllegalTransition { .. } => {
                (StatusCode::CONFLICT, "ILLEGAL_TRANSITION")
            }
            LifecycleError::RevisionLimitExceeded { .. } => {
                (StatusCode::CONFLICT, "REVISION_LIMIT_EXCEEDED")
            }
            LifecycleError::NotEligible(_) => (StatusCode::FORBIDDEN, "NOT_ELIGIBLE"),
            LifecycleError::PaymentNotSettled { .. } | LifecycleError::PaymentMismatch => {
                (StatusCode::PAYMENT_REQUIRED, "PAYMENT_FAILED")
            }
        },

        StorageError::Review(e) => match e {
            ReviewError::NotEligible(_) => (StatusCode::FORBIDDEN, "NOT_ELIGIBLE"),
            ReviewError::DuplicateReview => (StatusCode::CONFLICT, "DUPLICATE_REVIEW"),
            ReviewError::AlreadyResponded => (StatusCode::CONFLICT, "ALREADY_RESPONDED"),
            ReviewError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        },

        StorageError::Payment(e) => match e {
            PaymentError::Gateway(_) => (StatusCode::PAYMENT_REQUIRED, "PAYMENT_FAILED"),
            PaymentError::UnknownSession(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            PaymentError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Storage(err) => storage_code(err),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use werkmarkt_types::PostingStatus;

    #[test]
    fn rejections_map_to_stable_codes() {
        let (status, code) =
            storage_code(&StorageError::Proposal(ProposalError::AlreadyAssigned));
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "ALREADY_ASSIGNED");

        let (status, code) = storage_code(&StorageError::Lifecycle(
            LifecycleError::RevisionLimitExceeded { allowed: 2 },
        ));
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "REVISION_LIMIT_EXCEEDED");

        let (status, code) = storage_code(&StorageError::Catalog(CatalogError::Validation(
            "too short".into(),
        )));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "VALIDATION_ERROR");

        let (status, _) = storage_code(&StorageError::Catalog(
            CatalogError::IllegalTransition {
                from: PostingStatus::Completed,
            },
        ));
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_status_codes() {
        assert_eq!(
            ApiError::NotFound("x".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadRequest("x".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Storage(StorageError::Review(ReviewError::DuplicateReview))
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
    }
}
