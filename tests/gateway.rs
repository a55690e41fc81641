#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests for the authentication gateway middleware.
//!
//! A `/whoami` handler sits behind the gateway and records whether it ran and
//! which identity it observed.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    routing::get,
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use carpool_api::api::v1::extractors::AuthCtx;
use carpool_api::middleware::auth::access;
use carpool_api::services::auth::UserIdentity;
use jsonwebtoken::Algorithm;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{MemoryDirectory, TRUSTED_PRIVATE, UNTRUSTED_PRIVATE, now, token_with, user, valid_token};

struct Harness {
    router: Router,
    directory: Arc<MemoryDirectory>,
    hits: Arc<AtomicUsize>,
}

impl Harness {
    fn new(users: Vec<UserIdentity>) -> Self {
        let directory = Arc::new(MemoryDirectory::with(users));
        let hits = Arc::new(AtomicUsize::new(0));

        let whoami = {
            let hits = hits.clone();
            move |auth: AuthCtx| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(serde_json::to_value(auth.identity()).unwrap())
                }
            }
        };

        let router = access::apply(
            Router::new().route("/whoami", get(whoami)),
            common::gateway(directory.clone()),
        );

        Self {
            router,
            directory,
            hits,
        }
    }

    async fn call(&self, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            req = req.header(header::AUTHORIZATION, value);
        }

        let res = self
            .router
            .clone()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn scenario_a_known_subject_reaches_handler_with_identity() {
    let abc = user("abc");
    let harness = Harness::new(vec![abc.clone()]);

    let (status, body) = harness
        .call(Some(&format!("Bearer {}", valid_token("abc"))))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(abc.id));
    assert_eq!(body["external_id"], "abc");
    assert_eq!(body["email"], "abc@example.com");
    assert_eq!(harness.hits(), 1);
    assert_eq!(harness.directory.calls(), 1);
}

#[tokio::test]
async fn scenario_b_unprovisioned_subject_is_rejected() {
    let harness = Harness::new(vec![user("someone-else")]);

    let (status, body) = harness
        .call(Some(&format!("Bearer {}", valid_token("abc"))))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Invalid token"}));
    assert_eq!(harness.hits(), 0);
}

#[tokio::test]
async fn scenario_c_malformed_header_is_missing_credential() {
    let harness = Harness::new(vec![user("abc")]);

    let (status, body) = harness.call(Some("Malformed")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "No token provided"}));
    assert_eq!(harness.hits(), 0);
    assert_eq!(harness.directory.calls(), 0);
}

#[tokio::test]
async fn missing_header_never_reaches_directory() {
    let harness = Harness::new(vec![user("abc")]);

    let (status, body) = harness.call(None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "No token provided"}));
    assert_eq!(harness.directory.calls(), 0);
    assert_eq!(harness.hits(), 0);
}

#[tokio::test]
async fn forged_signature_is_rejected_without_detail() {
    let harness = Harness::new(vec![user("abc")]);
    let forged = token_with(
        UNTRUSTED_PRIVATE,
        Algorithm::RS256,
        json!({"sub": "abc", "exp": now() + 600}),
    );

    let (status, body) = harness.call(Some(&format!("Bearer {forged}"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Invalid token"}));
    let text = body.to_string().to_lowercase();
    assert!(!text.contains("signature"));
    assert_eq!(harness.directory.calls(), 0);
    assert_eq!(harness.hits(), 0);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let harness = Harness::new(vec![user("abc")]);
    let expired = token_with(
        TRUSTED_PRIVATE,
        Algorithm::RS256,
        json!({"sub": "abc", "exp": now() - 3600}),
    );

    let (status, body) = harness.call(Some(&format!("Bearer {expired}"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Invalid token"}));
    assert_eq!(harness.directory.calls(), 0);
}

#[tokio::test]
async fn disallowed_algorithms_are_rejected() {
    let harness = Harness::new(vec![user("abc")]);

    let rs512 = token_with(
        TRUSTED_PRIVATE,
        Algorithm::RS512,
        json!({"sub": "abc", "exp": now() + 600}),
    );
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({"sub": "abc", "exp": now() + 600})
            .to_string()
            .as_bytes(),
    );
    let unsigned = format!("{header}.{payload}.");

    for token in [rs512, unsigned] {
        let (status, body) = harness.call(Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Invalid token"}));
    }
    assert_eq!(harness.directory.calls(), 0);
    assert_eq!(harness.hits(), 0);
}

#[tokio::test]
async fn same_token_resolves_to_same_identity_across_requests() {
    let abc = user("abc");
    let harness = Harness::new(vec![abc.clone()]);
    let bearer = format!("Bearer {}", valid_token("abc"));

    let (_, first) = harness.call(Some(&bearer)).await;
    let (_, second) = harness.call(Some(&bearer)).await;

    assert_eq!(first, second);
    assert_eq!(first["id"], json!(abc.id));
    assert_eq!(harness.directory.calls(), 2);
}

#[tokio::test]
async fn concurrent_requests_for_different_users_stay_separate() {
    let alice = user("alice");
    let bob = user("bob");
    let harness = Arc::new(Harness::new(vec![alice.clone(), bob.clone()]));

    let a = {
        let h = harness.clone();
        tokio::spawn(async move { h.call(Some(&format!("Bearer {}", valid_token("alice")))).await })
    };
    let b = {
        let h = harness.clone();
        tokio::spawn(async move { h.call(Some(&format!("Bearer {}", valid_token("bob")))).await })
    };

    let (_, a_body) = a.await.unwrap();
    let (_, b_body) = b.await.unwrap();

    assert_eq!(a_body["id"], json!(alice.id));
    assert_eq!(b_body["id"], json!(bob.id));
}

#[tokio::test]
async fn handler_without_gateway_sees_no_identity() {
    let router: Router = Router::new().route(
        "/unguarded",
        get(|auth: AuthCtx| async move { auth.user_id().to_string() }),
    );

    let res = router
        .oneshot(
            Request::builder()
                .uri("/unguarded")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
