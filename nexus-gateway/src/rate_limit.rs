//! Ingress Guard (C9): per-IP, per-route sliding-window rate limiting.
//!
//! In-memory only, suitable for a single gateway instance. A production
//! multi-instance deployment would back this with a shared store; that is
//! out of scope here. Keys are `"{client_ip}:{first_path_segment}"`, so
//! `/v1/quotes` and `/v1/payments` are governed independently per client.

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);
const STALE_AGE: Duration = Duration::from_secs(300);

const EXEMPT_PATHS: &[&str] = &["/health", "/metrics"];

/// Path-prefix overrides, most specific first. Falls back to the
/// configured default requests-per-minute when nothing matches.
const ENDPOINT_LIMITS: &[(&str, u32)] = &[
    ("/v1/iso20022/pacs008", 120),
    ("/v1/quotes", 60),
    ("/v1/addressing/resolve", 60),
    ("/v1/rates", 120),
    ("/health", 300),
];

struct Window {
    started_at: Instant,
    count: u32,
}

/// Shared rate-limiter state, installed once into the axum `Router`.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    last_cleanup: Mutex<Instant>,
    enabled: bool,
    default_rpm: u32,
    burst: u32,
}

impl RateLimiter {
    pub fn new(enabled: bool, default_rpm: u32, burst: u32) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            last_cleanup: Mutex::new(Instant::now()),
            enabled,
            default_rpm,
            burst,
        }
    }

    fn limit_for_path(&self, path: &str) -> u32 {
        ENDPOINT_LIMITS
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix))
            .map(|(_, limit)| *limit)
            .unwrap_or(self.default_rpm)
            + self.burst
    }

    fn maybe_cleanup(&self) {
        let mut last = self.last_cleanup.lock().unwrap();
        if last.elapsed() < CLEANUP_INTERVAL {
            return;
        }
        *last = Instant::now();
        let mut windows = self.windows.lock().unwrap();
        windows.retain(|_, w| w.started_at.elapsed() <= STALE_AGE);
    }

    /// Returns `(allowed, limit, remaining, reset_seconds)`.
    fn check(&self, key: &str, path: &str) -> (bool, u32, u32, u64) {
        self.maybe_cleanup();
        let limit = self.limit_for_path(path);
        let mut windows = self.windows.lock().unwrap();
        let now = Instant::now();
        let entry = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now.duration_since(entry.started_at) >= WINDOW {
            entry.started_at = now;
            entry.count = 1;
            return (true, limit, limit - 1, WINDOW.as_secs());
        }

        let elapsed = now.duration_since(entry.started_at);
        let reset = WINDOW.saturating_sub(elapsed).as_secs().max(1);

        if entry.count >= limit {
            return (false, limit, 0, reset);
        }

        entry.count += 1;
        (true, limit, limit - entry.count, reset)
    }
}

fn client_ip(headers: &HeaderMap, connect_info: Option<&SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("X-Forwarded-For").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            return first.trim().to_string();
        }
    }
    connect_info
        .map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn first_path_segment(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or("root")
}

/// Axum middleware entry point: `middleware::from_fn_with_state(limiter, enforce)`.
pub async fn enforce(
    State(limiter): State<std::sync::Arc<RateLimiter>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    req: Request,
    next: Next,
) -> Response {
    if !limiter.enabled {
        return next.run(req).await;
    }

    let path = req.uri().path().to_string();
    if EXEMPT_PATHS.iter().any(|p| path == *p) {
        return next.run(req).await;
    }

    let ip = client_ip(req.headers(), connect_info.as_ref().map(|c| &c.0));
    let key = format!("{ip}:{}", first_path_segment(&path));
    let (allowed, limit, remaining, reset) = limiter.check(&key, &path);

    if !allowed {
        crate::metrics::METRICS.rate_limit_rejections_total.inc();
        let body = Json(json!({
            "error": "RATE_LIMIT_EXCEEDED",
            "message": format!("too many requests, maximum {limit} per 60 seconds"),
            "retryAfter": reset,
            "limit": limit,
        }));
        let mut resp = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        insert_rate_limit_headers(resp.headers_mut(), limit, 0, reset);
        resp.headers_mut()
            .insert("Retry-After", header_value(reset));
        return resp;
    }

    let mut resp = next.run(req).await;
    insert_rate_limit_headers(resp.headers_mut(), limit, remaining, reset);
    resp
}

fn header_value(n: u64) -> axum::http::HeaderValue {
    axum::http::HeaderValue::from_str(&n.to_string()).expect("ASCII digits are valid header values")
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset: u64) {
    headers.insert("X-RateLimit-Limit", header_value(limit as u64));
    headers.insert("X-RateLimit-Remaining", header_value(remaining as u64));
    headers.insert("X-RateLimit-Reset", header_value(reset));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_rejects() {
        let limiter = RateLimiter::new(true, 2, 0);
        let (allowed1, ..) = limiter.check("1.2.3.4:v1", "/v1/quotes");
        let (allowed2, ..) = limiter.check("1.2.3.4:v1", "/v1/quotes");
        let (allowed3, _, remaining3, _) = limiter.check("1.2.3.4:v1", "/v1/quotes");
        assert!(allowed1);
        assert!(allowed2);
        assert!(!allowed3);
        assert_eq!(remaining3, 0);
    }

    #[test]
    fn endpoint_override_beats_default() {
        let limiter = RateLimiter::new(true, 10, 0);
        assert_eq!(limiter.limit_for_path("/v1/quotes"), 60);
        assert_eq!(limiter.limit_for_path("/v1/unknown"), 10);
    }

    #[test]
    fn distinct_keys_do_not_share_a_window() {
        let limiter = RateLimiter::new(true, 1, 0);
        let (a, ..) = limiter.check("1.1.1.1:v1", "/v1/x");
        let (b, ..) = limiter.check("2.2.2.2:v1", "/v1/x");
        assert!(a);
        assert!(b);
    }
}
