//! In-process tests of the public API through the full middleware stack.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use realty_site::config::{RateLimitQuota, SiteConfig};
use realty_site::security::generate_csrf_token;
use realty_site::SiteServer;

mod common;
use common::{body_json, empty_request, json_request, test_config, FakeSource};

fn router_with(config: SiteConfig, source: Arc<FakeSource>) -> Router {
    SiteServer::with_source(config, source).router()
}

fn form_request(uri: &str, body: &Value, csrf_header: Option<&str>, client: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", client);
    if let Some(token) = csrf_header {
        builder = builder.header("x-csrf-token", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn valid_contact(token: &str) -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "phone": "555-123-4567",
        "message": "I'd like to see the house on Elm.",
        "_csrf": token,
    })
}

#[tokio::test]
async fn test_contact_with_bad_fields_is_validation_error() {
    let app = router_with(test_config(), FakeSource::with_posts(&[]));
    let token = generate_csrf_token();
    let body = json!({"name": "A", "email": "bad", "message": "hi", "_csrf": token});

    let res = app
        .oneshot(form_request("/api/contact", &body, Some(&token), "10.0.0.1"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let json = body_json(res).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "Please check your input and try again.");
    // Internal validation detail stays in the logs.
    assert!(!json.to_string().contains("Invalid email format"));
}

#[tokio::test]
async fn test_contact_accepted() {
    let app = router_with(test_config(), FakeSource::with_posts(&[]));
    let token = generate_csrf_token();

    let res = app
        .oneshot(form_request("/api/contact", &valid_contact(&token), Some(&token), "10.0.0.2"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let json = body_json(res).await;
    assert_eq!(json["success"], true);
    assert!(json["message"].as_str().unwrap().starts_with("Thank you"));
}

#[tokio::test]
async fn test_contact_with_blank_optional_phone_accepted() {
    let app = router_with(test_config(), FakeSource::with_posts(&[]));
    let token = generate_csrf_token();
    let body = json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "phone": "",
        "message": "hi",
        "_csrf": token,
    });

    let res = app
        .clone()
        .oneshot(form_request("/api/contact", &body, Some(&token), "10.0.1.1"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["success"], true);

    // A blank required field is still missing.
    let body = json!({"name": "Jane Doe", "email": "", "message": "hi", "_csrf": token});
    let res = app
        .oneshot(form_request("/api/contact", &body, Some(&token), "10.0.1.1"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_csrf_required() {
    let app = router_with(test_config(), FakeSource::with_posts(&[]));
    let token = generate_csrf_token();

    // Header missing.
    let res = app
        .clone()
        .oneshot(form_request("/api/contact", &valid_contact(&token), None, "10.0.0.3"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["code"], "CSRF_TOKEN_INVALID");

    // Header present but different.
    let other = generate_csrf_token();
    let res = app
        .oneshot(form_request("/api/contact", &valid_contact(&token), Some(&other), "10.0.0.3"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["code"], "CSRF_TOKEN_INVALID");
}

#[tokio::test]
async fn test_sixth_contact_in_window_is_rate_limited() {
    let app = router_with(test_config(), FakeSource::with_posts(&[]));
    let token = generate_csrf_token();

    for _ in 0..5 {
        let res = app
            .clone()
            .oneshot(form_request("/api/contact", &valid_contact(&token), Some(&token), "10.0.0.4"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = app
        .clone()
        .oneshot(form_request("/api/contact", &valid_contact(&token), Some(&token), "10.0.0.4"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["code"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(json["message"], "Too many requests. Please try again later.");

    // Another client and another form keep their own quotas.
    let res = app
        .clone()
        .oneshot(form_request("/api/contact", &valid_contact(&token), Some(&token), "10.0.0.5"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let search = json!({"searchQuery": "3 bed near park", "_csrf": token});
    let res = app
        .oneshot(form_request("/api/search", &search, Some(&token), "10.0.0.4"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_spoofed_forwarded_for_ignored_without_trusted_proxy() {
    let mut config = test_config();
    config.security.trust_proxy_headers = false;
    let app = router_with(config, FakeSource::with_posts(&[]));
    let token = generate_csrf_token();

    for i in 0..5 {
        let client = format!("198.51.100.{i}");
        let res = app
            .clone()
            .oneshot(form_request("/api/contact", &valid_contact(&token), Some(&token), &client))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = app
        .oneshot(form_request("/api/contact", &valid_contact(&token), Some(&token), "198.51.100.99"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["code"], "RATE_LIMIT_EXCEEDED");
}

#[tokio::test]
async fn test_rate_limit_counts_rejected_submissions() {
    let mut config = test_config();
    config.rate_limits.home_value = RateLimitQuota::new(1, 60_000);
    let app = router_with(config, FakeSource::with_posts(&[]));

    let res = app
        .clone()
        .oneshot(form_request("/api/home-value", &json!({}), None, "10.0.0.6"))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["code"], "CSRF_TOKEN_INVALID");

    let res = app
        .oneshot(form_request("/api/home-value", &json!({}), None, "10.0.0.6"))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["code"], "RATE_LIMIT_EXCEEDED");
}

#[tokio::test]
async fn test_required_fields_per_form() {
    let app = router_with(test_config(), FakeSource::with_posts(&[]));
    let token = generate_csrf_token();

    let missing_address = json!({"email": "jane@example.com", "_csrf": token});
    let res = app
        .clone()
        .oneshot(form_request("/api/home-value", &missing_address, Some(&token), "10.0.0.7"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["code"], "VALIDATION_ERROR");

    let complete = json!({
        "address": "12 Elm St, Springfield",
        "email": "jane@example.com",
        "_csrf": token,
    });
    let res = app
        .oneshot(form_request("/api/home-value", &complete, Some(&token), "10.0.0.7"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["success"], true);
}

#[tokio::test]
async fn test_non_object_body_rejected() {
    let app = router_with(test_config(), FakeSource::with_posts(&[]));

    for body in [json!(["a"]), json!("text"), json!(null)] {
        let res = app
            .clone()
            .oneshot(form_request("/api/search", &body, None, "10.0.0.8"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_form_routes_reject_other_methods() {
    let app = router_with(test_config(), FakeSource::with_posts(&[]));

    for (method, uri) in [
        ("GET", "/api/contact"),
        ("PUT", "/api/home-value"),
        ("DELETE", "/api/search"),
    ] {
        let res = app.clone().oneshot(empty_request(method, uri)).await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(res.headers()[header::ALLOW], "POST");
        let json = body_json(res).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Method not allowed");
    }
}

#[tokio::test]
async fn test_sync_without_secret_is_open() {
    let source = FakeSource::with_posts(&["first", "second"]);
    let app = router_with(test_config(), source.clone());

    let res = app
        .oneshot(empty_request("POST", "/api/blog/sync"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let json = body_json(res).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["postsFound"], 2);
    assert_eq!(json["newPosts"], 2);
    assert_eq!(json["revalidated"], false);
    assert!(json["lastSync"].is_string());
    assert!(json.get("error").is_none());
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_sync_with_secret_requires_bearer() {
    let mut config = test_config();
    config.security.revalidate_secret = Some("s3cret".to_string());
    let source = FakeSource::with_posts(&["first"]);
    let app = router_with(config, source.clone());

    let res = app
        .clone()
        .oneshot(empty_request("POST", "/api/blog/sync"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(res).await["message"], "Unauthorized");

    let wrong = Request::builder()
        .method("DELETE")
        .uri("/api/blog/sync")
        .header(header::AUTHORIZATION, "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(wrong).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(source.calls(), 0);

    let right = Request::builder()
        .method("POST")
        .uri("/api/blog/sync")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(right).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["postsFound"], 1);

    // Status stays public.
    let res = app
        .oneshot(empty_request("GET", "/api/blog/sync"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_failed_sync_reports_safe_error() {
    let source = FakeSource::with_posts(&[]);
    source.fail();
    let app = router_with(test_config(), source);

    let res = app
        .oneshot(empty_request("POST", "/api/blog/sync"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let json = body_json(res).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["postsFound"], 0);
    assert_eq!(json["revalidated"], false);
    assert_eq!(json["error"], "Failed to refresh blog posts from upstream");
}

#[tokio::test]
async fn test_clear_then_status_is_empty() {
    let source = FakeSource::with_posts(&["first", "second"]);
    let app = router_with(test_config(), source);

    let res = app
        .clone()
        .oneshot(empty_request("POST", "/api/blog/sync"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let json = body_json(
        app.clone()
            .oneshot(empty_request("GET", "/api/blog/sync"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(json["hasCache"], true);
    assert_eq!(json["postCount"], 2);
    assert_eq!(json["isExpired"], false);

    let res = app
        .clone()
        .oneshot(empty_request("DELETE", "/api/blog/sync"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["success"], true);

    let json = body_json(
        app.oneshot(empty_request("GET", "/api/blog/sync"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(json["success"], true);
    assert_eq!(json["hasCache"], false);
    assert_eq!(json["postCount"], 0);
}

#[tokio::test]
async fn test_posts_are_cached_and_marked_external() {
    let source = FakeSource::with_posts(&["first", "second"]);
    let app = router_with(test_config(), source.clone());

    for _ in 0..3 {
        let res = app
            .clone()
            .oneshot(empty_request("GET", "/api/blog/posts"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let json = body_json(res).await;
        assert_eq!(json["degraded"], false);
        let posts = json["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0]["slug"], "first");
        assert_eq!(posts[0]["external"], true);
        assert_eq!(posts[0]["rel"], "noopener noreferrer");
    }
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_posts_degraded_when_upstream_down() {
    let source = FakeSource::with_posts(&[]);
    source.fail();
    let app = router_with(test_config(), source);

    let res = app
        .oneshot(empty_request("GET", "/api/blog/posts"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let json = body_json(res).await;
    assert_eq!(json["degraded"], true);
    assert_eq!(json["posts"], json!([]));
}

#[tokio::test]
async fn test_csrf_token_endpoint() {
    let app = router_with(test_config(), FakeSource::with_posts(&[]));

    let res = app
        .oneshot(empty_request("GET", "/api/csrf-token"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CACHE_CONTROL], "no-store");

    let json = body_json(res).await;
    let token = json["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_web_vitals() {
    let app = router_with(test_config(), FakeSource::with_posts(&[]));

    let res = app
        .clone()
        .oneshot(json_request("POST", "/api/web-vitals", &json!({"name": "LCP", "value": 1234.5})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["success"], true);

    let bad = Request::builder()
        .method("POST")
        .uri("/api/web-vitals")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.oneshot(bad).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(res).await["success"], false);
}

#[tokio::test]
async fn test_middleware_headers() {
    let app = router_with(test_config(), FakeSource::with_posts(&[]));

    let res = app.oneshot(empty_request("GET", "/healthz")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(res.headers()[header::X_FRAME_OPTIONS], "DENY");

    let json = body_json(res).await;
    assert_eq!(json["status"], "operational");
}

#[tokio::test]
async fn test_security_headers_can_be_disabled() {
    let mut config = test_config();
    config.security.enable_headers = false;
    let app = router_with(config, FakeSource::with_posts(&[]));

    let res = app.oneshot(empty_request("GET", "/healthz")).await.unwrap();
    assert!(!res.headers().contains_key(header::X_FRAME_OPTIONS));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let mut config = test_config();
    config.security.max_body_size = 128;
    let app = router_with(config, FakeSource::with_posts(&[]));

    let body = json!({"message": "x".repeat(1024)});
    let res = app
        .oneshot(form_request("/api/contact", &body, None, "10.0.0.9"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
