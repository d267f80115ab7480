//! Product routes behind the gate, with stubbed credential resolution.

mod common;

use axum::http::StatusCode;
use common::{app, get, post, send, StubResolver};
use rust_common::{InvalidReason, UnavailableCause, VerificationOutcome};
use serde_json::json;

#[tokio::test]
async fn catalogue_requires_credential() {
    let resolver = StubResolver::valid("u1");
    let app = app(resolver.clone());

    for uri in ["/products", "/products/p-001", "/products/category/Books"] {
        let (status, body) = send(&app, get(uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "AUTH_TOKEN_MISSING");
    }
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn catalogue_reads_with_credential() {
    let resolver = StubResolver::valid("u1");
    let app = app(resolver.clone());

    let (status, body) = send(&app, get("/products", Some("tok"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 10);

    let (status, body) = send(&app, get("/products?category=Books", Some("tok"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, body) = send(&app, get("/products/category/Books", Some("tok"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, body) = send(&app, get("/products/p-001", Some("tok"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Laptop Pro 15");

    assert_eq!(resolver.calls(), 4);
}

#[tokio::test]
async fn refused_credential_cannot_read_catalogue() {
    let refused = StubResolver::new(VerificationOutcome::Invalid(InvalidReason::Rejected));
    let app = app(refused.clone());

    let (status, body) = send(&app, get("/products", Some("forged"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "AUTH_TOKEN_INVALID");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn unknown_product_is_404() {
    let app = app(StubResolver::valid("u1"));
    let (status, body) = send(&app, get("/products/p-999", Some("tok"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "PRODUCT_NOT_FOUND");
}

#[tokio::test]
async fn purchase_is_recorded_for_resolved_identity() {
    let app = app(StubResolver::valid("u-alice"));

    let (status, body) = send(
        &app,
        post(
            "/purchases",
            Some("any"),
            &json!({ "product_id": "p-002", "quantity": 2, "user_id": "someone-else" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_id"], "u-alice");
    assert_eq!(body["product_name"], "Wireless Headphones");
    assert_eq!(body["total_cents"], 39_998);
}

#[tokio::test]
async fn purchase_quantity_defaults_to_one() {
    let app = app(StubResolver::valid("u1"));
    let (status, body) = send(
        &app,
        post("/purchases", Some("any"), &json!({ "product_id": "p-008" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], 1);
    assert_eq!(body["total_cents"], 899);
}

#[tokio::test]
async fn purchase_validation() {
    let app = app(StubResolver::valid("u1"));

    let (status, body) = send(
        &app,
        post(
            "/purchases",
            Some("any"),
            &json!({ "product_id": "p-001", "quantity": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");

    let (status, _) = send(
        &app,
        post("/purchases", Some("any"), &json!({ "product_id": "p-999" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn my_purchases_only_lists_callers_purchases() {
    let alice = StubResolver::valid("u-alice");
    let bob = StubResolver::valid("u-bob");
    let service_app = app(alice);

    send(
        &service_app,
        post("/purchases", Some("a"), &json!({ "product_id": "p-001" })),
    )
    .await;
    send(
        &service_app,
        post("/purchases", Some("a"), &json!({ "product_id": "p-004" })),
    )
    .await;

    let (status, body) = send(&service_app, get("/purchases/me", Some("a"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["product_id"], "p-004");
    assert_eq!(body["data"][1]["product_id"], "p-001");

    let (_, body) = send(&app(bob), get("/purchases/me", Some("b"))).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn purchases_by_user_id_are_gated() {
    let resolver = StubResolver::valid("u-alice");
    let service_app = app(resolver.clone());

    send(
        &service_app,
        post("/purchases", Some("a"), &json!({ "product_id": "p-006" })),
    )
    .await;

    let (status, _) = send(&service_app, get("/purchases/user/u-alice", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&service_app, get("/purchases/user/u-alice", Some("a"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["product_id"], "p-006");

    let (status, body) = send(&service_app, get("/purchases/user/u-nobody", Some("a"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn missing_credential_is_401_without_resolving() {
    let resolver = StubResolver::valid("u1");
    let app = app(resolver.clone());

    let (status, body) = send(&app, get("/purchases/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTH_TOKEN_MISSING");
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn refused_credential_is_403_and_nothing_is_recorded() {
    let refused = StubResolver::new(VerificationOutcome::Invalid(InvalidReason::Expired));
    let app = app(refused.clone());

    let (status, body) = send(
        &app,
        post("/purchases", Some("old"), &json!({ "product_id": "p-001" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "AUTH_TOKEN_INVALID");
    assert_eq!(refused.calls(), 1);
}

#[tokio::test]
async fn unavailable_issuer_is_503() {
    let down = StubResolver::new(VerificationOutcome::ServiceUnavailable(
        UnavailableCause::Transport(tonic::Code::Unavailable),
    ));
    let app = app(down);

    let (status, body) = send(&app, get("/purchases/me", Some("tok"))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "AUTH_SERVICE_UNAVAILABLE");
    assert!(body["correlation_id"].is_string());
}

#[tokio::test]
async fn health_and_metrics() {
    let app = app(StubResolver::valid("u1"));
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "product-service");

    let (status, _) = send(&app, get("/metrics", None)).await;
    assert_eq!(status, StatusCode::OK);
}
