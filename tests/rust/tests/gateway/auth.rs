//! Authentication in front of every protected route

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tabletop_gateway::{create_access_token, validate_token};
use tests::fixtures::{FOREST, MASTER, PLACED_TOKEN};
use tower::ServiceExt;

use super::{body_json, json_request, token_for, TestGateway, SECRET};

#[tokio::test]
async fn health_needs_no_token() {
    let gateway = TestGateway::new();

    let response = gateway
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn mutation_without_token_is_unauthorized() {
    let gateway = TestGateway::new();

    let response = gateway
        .router
        .oneshot(json_request(
            "POST",
            &format!("/placed/{}/move", PLACED_TOKEN),
            None,
            json!({"pos_x": 1, "pos_y": 1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    assert_eq!(gateway.repos.placed.snapshot(PLACED_TOKEN).unwrap().pos_x, 5);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_unauthorized() {
    let gateway = TestGateway::new();
    let forged = create_access_token(MASTER, 3600, b"some-other-secret").unwrap();

    let response = gateway
        .router
        .oneshot(
            Request::post(format!("/scenes/{}/placed", FOREST))
                .header(header::AUTHORIZATION, format!("Bearer {}", forged))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let gateway = TestGateway::new();
    let expired = create_access_token(MASTER, -60, SECRET).unwrap();

    let response = gateway
        .router
        .oneshot(
            Request::get("/sync")
                .header(header::AUTHORIZATION, format!("Bearer {}", expired))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sync_accepts_token_in_query_string() {
    let gateway = TestGateway::new();

    let response = gateway
        .router
        .oneshot(
            Request::get(format!("/sync?access_token={}", token_for(MASTER)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Authenticated, then refused only because this is not a WebSocket upgrade
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.status().is_client_error());
}

#[test]
fn minted_tokens_round_trip() {
    let token = token_for(MASTER);
    let caller = validate_token(&token, SECRET).unwrap();

    assert_eq!(caller.user_id, MASTER);
    assert!(caller.exp > caller.iat);
    assert!(validate_token(&token, b"").is_none());
}
