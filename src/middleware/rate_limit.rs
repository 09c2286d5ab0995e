use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{Extensions, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::is_throttle_exempt;
use crate::auth::Principal;
use crate::config::RateLimitConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Buckets refill to full capacity once per rolling window.
const REFILL_WINDOW: Duration = Duration::from_secs(60);

struct Bucket {
    remaining: u32,
    window_start: Instant,
}

/// Process-wide keyed token-bucket registry shared by all concurrent
/// requests. One bucket per distinct key for the process lifetime; buckets
/// are created lazily and never evicted.
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Consume one token from the bucket for `key`, creating the bucket at
    /// the tier's capacity on first sight. The check-and-decrement runs
    /// under the registry lock, so concurrent requests sharing a key
    /// serialize and no token is handed out twice.
    pub fn try_acquire(&self, key: &str) -> bool {
        self.try_acquire_at(key, Instant::now())
    }

    fn try_acquire_at(&self, key: &str, now: Instant) -> bool {
        let capacity = self.capacity_for(key);
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());

        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            remaining: capacity,
            window_start: now,
        });

        if now.duration_since(bucket.window_start) >= REFILL_WINDOW {
            bucket.remaining = capacity;
            bucket.window_start = now;
        }

        if bucket.remaining == 0 {
            return false;
        }
        bucket.remaining -= 1;
        true
    }

    // Tier selection branches on the key prefix only; admin_per_minute is
    // configured but not consulted here.
    fn capacity_for(&self, key: &str) -> u32 {
        if key.starts_with("user:") {
            self.config.authenticated_per_minute
        } else {
            self.config.unauthenticated_per_minute
        }
    }
}

/// Rate limiting stage. Ordered after authentication and tenant
/// propagation so the key branch can see the principal; rejections are
/// emitted here directly because this stage terminates the chain before
/// the regular error plumbing applies.
pub async fn throttle(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.rate_limit.enabled || is_throttle_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let key = throttle_key(&request);
    if state.limiter.try_acquire(&key) {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    tracing::warn!(%key, %path, "request rejected by rate limiter");
    ApiError::too_many_requests("Request rate limit exceeded, try again shortly")
        .with_path(path)
        .into_response()
}

fn throttle_key(request: &Request) -> String {
    if let Some(principal) = request.extensions().get::<Principal>() {
        return format!("user:{}", principal.id);
    }
    format!("ip:{}", client_ip(request.headers(), request.extensions()))
}

/// Client address resolution: first `X-Forwarded-For` entry, then
/// `X-Real-IP`, then the raw socket address.
fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
