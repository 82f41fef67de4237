//! REST surface smoke tests
//!
//! Drives the router directly with `tower::ServiceExt::oneshot`; no
//! listener is bound.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;
use werkmarkt_daemon::api::create_router;
use werkmarkt_daemon::api::rest::state::AppState;
use werkmarkt_daemon::config::ServerConfig;
use werkmarkt_daemon::InMemoryStorage;
use werkmarkt_payments::MockGateway;

fn app_with(server: &ServerConfig) -> Router {
    let state = AppState::new(
        Arc::new(InMemoryStorage::new()),
        Arc::new(MockGateway::new()),
    );
    create_router(state, server)
}

fn app() -> Router {
    app_with(&ServerConfig::default())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, actor: Option<(&Uuid, &str)>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some((id, role)) = actor {
        builder = builder
            .header("x-actor-id", id.to_string())
            .header("x-actor-role", role);
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn posting_body() -> Value {
    json!({
        "title": "Translate our onboarding emails",
        "description": "Six onboarding emails need translation from German to French, \
                        keeping the informal tone of the originals.",
        "budgetType": "fixed",
        "budgetMin": 50_000,
        "currency": "chf",
        "publish": true,
    })
}

#[tokio::test]
async fn health_endpoint_responds() {
    let response = app().oneshot(get("/api/v1/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn posting_creation_requires_actor_headers() {
    let response = app()
        .oneshot(post_json("/api/v1/postings", None, &posting_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn posting_round_trip_through_the_api() {
    let app = app();
    let owner = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/postings",
            Some((&owner, "client")),
            &posting_body(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["status"], "open");
    let posting_id = created["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get("/api/v1/postings?page=1&perPage=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["meta"]["currentPage"], 1);
    assert_eq!(listed["meta"]["totalItems"], 1);
    assert_eq!(listed["data"][0]["id"], posting_id.as_str());

    let response = app
        .clone()
        .oneshot(get(&format!("/api/v1/postings/{}", posting_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["data"]["viewCount"], 1);
}

#[tokio::test]
async fn deleting_a_posting_closes_it() {
    let app = app();
    let owner = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/postings",
            Some((&owner, "client")),
            &posting_body(),
        ))
        .await
        .unwrap();
    let posting_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/postings/{}", posting_id))
                .header("x-actor-id", owner.to_string())
                .header("x-actor-role", "client")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "cancelled");

    // A closed posting no longer surfaces in the public list.
    let response = app
        .clone()
        .oneshot(get("/api/v1/postings?status=open"))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed["meta"]["totalItems"], 0);
}

#[tokio::test]
async fn accept_flow_mints_an_engagement_over_http() {
    let app = app();
    let owner = Uuid::new_v4();
    let bidder = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/postings",
            Some((&owner, "client")),
            &posting_body(),
        ))
        .await
        .unwrap();
    let posting_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/postings/{}/proposals", posting_id),
            Some((&bidder, "expert")),
            &json!({
                "coverLetter": "Native French speaker with five years of marketing \
                                localization experience for Swiss clients.",
                "proposedPrice": 48_000,
                "currency": "chf",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let proposal_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Only the posting owner may accept.
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/postings/proposals/{}/accept", proposal_id),
            Some((&bidder, "expert")),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/postings/proposals/{}/accept", proposal_id),
            Some((&owner, "client")),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let accepted = body_json(response).await;
    assert_eq!(accepted["data"]["status"], "accepted");
    assert_eq!(accepted["data"]["price"], 48_000);
    assert_eq!(accepted["data"]["platformFee"], 4_800);
}

#[tokio::test]
async fn unknown_resources_return_not_found() {
    let app = app();
    let user = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/projects/{}", Uuid::new_v4()))
                .header("x-actor-id", user.to_string())
                .header("x-actor-role", "client")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/payments/webhook",
            None,
            &json!({"type": "checkout.completed", "session_id": "cs_missing"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn cors_follows_the_server_config() {
    let browser_get = || {
        Request::builder()
            .uri("/api/v1/health")
            .header("origin", "https://app.werkmarkt.test")
            .body(Body::empty())
            .unwrap()
    };

    let response = app().oneshot(browser_get()).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap()),
        Some("*")
    );

    let server = ServerConfig {
        enable_cors: false,
        ..ServerConfig::default()
    };
    let response = app_with(&server).oneshot(browser_get()).await.unwrap();
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

#[tokio::test]
async fn validation_failures_are_unprocessable() {
    let response = app()
        .oneshot(post_json(
            "/api/v1/postings",
            Some((&Uuid::new_v4(), "client")),
            &json!({
                "title": "short",
                "description": "too short",
                "budgetType": "fixed",
                "budgetMin": 50_000,
                "currency": "chf",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
