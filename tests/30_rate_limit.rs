mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::Request;

use common::*;

fn limited_config(unauthenticated: u32, authenticated: u32) -> caterly_api::config::AppConfig {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.unauthenticated_per_minute = unauthenticated;
    config.rate_limit.authenticated_per_minute = authenticated;
    config
}

fn get_from_ip(path: &str, ip: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap()
}

// The N+1th request within the window from one unauthenticated address is
// rejected with the shared 429 envelope.
#[tokio::test]
async fn unauthenticated_bucket_exhausts_by_address() -> Result<()> {
    let app = build_app(limited_config(3, 100));

    for _ in 0..3 {
        let (status, _) = call(&app, get_from_ip("/", "203.0.113.5")).await;
        assert_eq!(status, 200);
    }

    let (status, body) = call(&app, get_from_ip("/", "203.0.113.5")).await;
    assert_eq!(status, 429);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 429);
    assert_eq!(body["error"], "Too Many Requests");
    assert_eq!(body["path"], "/");
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn distinct_addresses_have_distinct_buckets() -> Result<()> {
    let app = build_app(limited_config(1, 100));

    let (status, _) = call(&app, get_from_ip("/", "203.0.113.5")).await;
    assert_eq!(status, 200);
    let (status, _) = call(&app, get_from_ip("/", "203.0.113.5")).await;
    assert_eq!(status, 429);

    // A different source address is unaffected
    let (status, _) = call(&app, get_from_ip("/", "203.0.113.6")).await;
    assert_eq!(status, 200);
    Ok(())
}

#[tokio::test]
async fn authenticated_requests_are_keyed_by_user() -> Result<()> {
    let app = build_app(limited_config(3, 5));
    let token = access_token(&app, MANAGER).await;

    for _ in 0..5 {
        let (status, _) = call(&app, get_request("/api/v1/auth/whoami", Some(&token))).await;
        assert_eq!(status, 200);
    }

    let (status, body) = call(&app, get_request("/api/v1/auth/whoami", Some(&token))).await;
    assert_eq!(status, 429);
    assert_eq!(body["error"], "Too Many Requests");
    Ok(())
}

#[tokio::test]
async fn health_is_exempt_regardless_of_the_switch() -> Result<()> {
    let app = build_app(limited_config(1, 1));

    for _ in 0..10 {
        let (status, _) = call(&app, get_request("/health", None)).await;
        assert_eq!(status, 200);
    }
    Ok(())
}

#[tokio::test]
async fn global_switch_disables_throttling() -> Result<()> {
    let mut config = limited_config(1, 1);
    config.rate_limit.enabled = false;
    let app = build_app(config);

    for _ in 0..10 {
        let (status, _) = call(&app, get_from_ip("/", "203.0.113.5")).await;
        assert_eq!(status, 200);
    }
    Ok(())
}
