//! API Router configuration

use super::handlers;
use super::state::AppState;
use crate::config::ServerConfig;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let api_routes = Router::new()
        // Health and status
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::daemon_status))
        // Postings
        .route("/postings", get(handlers::list_postings))
        .route("/postings", post(handlers::create_posting))
        .route("/postings/:id", get(handlers::get_posting))
        .route("/postings/:id", patch(handlers::update_posting))
        .route("/postings/:id", delete(handlers::delete_posting))
        .route("/postings/:id/open", post(handlers::open_posting))
        .route("/postings/:id/close", post(handlers::close_posting))
        // Proposals
        .route("/postings/:id/proposals", get(handlers::list_proposals))
        .route("/postings/:id/proposals", post(handlers::submit_proposal))
        .route(
            "/postings/proposals/:id/accept",
            post(handlers::accept_proposal),
        )
        .route(
            "/postings/proposals/:id/shortlist",
            post(handlers::shortlist_proposal),
        )
        .route(
            "/postings/proposals/:id/reject",
            post(handlers::reject_proposal),
        )
        .route(
            "/postings/proposals/:id/withdraw",
            post(handlers::withdraw_proposal),
        )
        // Bookings
        .route("/bookings", get(handlers::list_bookings))
        .route("/bookings", post(handlers::submit_booking))
        .route("/bookings/:id/respond", post(handlers::respond_booking))
        .route("/bookings/:id/cancel", post(handlers::cancel_booking))
        // Projects (engagements)
        .route("/projects", get(handlers::list_engagements))
        .route("/projects/:id", get(handlers::get_engagement))
        .route("/projects/:id/start", post(handlers::start_work))
        .route("/projects/:id/deliver", post(handlers::deliver))
        .route(
            "/projects/:id/request-revision",
            post(handlers::request_revision),
        )
        .route("/projects/:id/complete", post(handlers::complete))
        .route("/projects/:id/dispute", post(handlers::open_dispute))
        .route("/projects/:id/cancel", post(handlers::cancel))
        .route("/projects/:id/resolve", post(handlers::resolve_dispute))
        // Reviews
        .route("/reviews", post(handlers::submit_review))
        .route("/reviews/:id/response", post(handlers::respond_to_review))
        .route("/reviews/:id/helpful", post(handlers::mark_helpful))
        .route("/reviews/user/:id", get(handlers::list_reviews_for_user))
        .route("/reviews/summary/:id", get(handlers::review_summary))
        // Payments
        .route("/payments/checkout", post(handlers::create_checkout))
        .route("/payments/webhook", post(handlers::payment_webhook))
        .route("/payments/:id", get(handlers::get_payment))
        // Payouts
        .route("/payouts", get(handlers::list_payouts))
        .route("/payouts/request", post(handlers::request_payout));

    // Build router with middleware
    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )));

    if server.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}
