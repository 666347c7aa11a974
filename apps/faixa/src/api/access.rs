//! # Access Policy
//!
//! Request gating for the graduation API: optional API key authentication
//! and a global request throttle, resolved once when the router is built.
//!
//! ## Configuration
//!
//! - `FAIXA_API_KEY`: If set, requests must carry `Authorization: Bearer <key>`
//! - `FAIXA_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//!
//! Denials use the same `{"success": false, "error": ...}` envelope as the
//! endpoint responses, so clients parse one shape everywhere.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Default throttle when `FAIXA_RATE_LIMIT` is unset.
const DEFAULT_RATE_LIMIT: u32 = 100;

/// Routes that stay open even when an API key is configured.
///
/// Load balancers probe `/health` without credentials.
const OPEN_ROUTES: &[&str] = &["/health"];

// =============================================================================
// POLICY
// =============================================================================

/// The resolved access configuration for one router.
///
/// Built from the environment at startup; a key or limit changed afterwards
/// takes effect on the next server start, not mid-flight.
#[derive(Clone)]
pub struct AccessPolicy {
    api_key: Option<Arc<str>>,
    limiter: Option<Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
}

impl AccessPolicy {
    /// Resolve the policy from `FAIXA_API_KEY` and `FAIXA_RATE_LIMIT`.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var("FAIXA_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .map(Arc::from);

        let rps = std::env::var("FAIXA_RATE_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT);
        let limiter = NonZeroU32::new(rps)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));

        Self { api_key, limiter }
    }

    /// Whether requests must present an API key.
    #[must_use]
    pub fn requires_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Whether the global request throttle is active.
    #[must_use]
    pub fn throttled(&self) -> bool {
        self.limiter.is_some()
    }
}

// =============================================================================
// GATE MIDDLEWARE
// =============================================================================

/// Single gate in front of every route: throttle first, then the key check.
///
/// Open routes skip the key check but still count against the throttle.
pub async fn gate(
    State(policy): State<AccessPolicy>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(limiter) = &policy.limiter
        && limiter.check().is_err()
    {
        tracing::warn!(
            event = "throttled",
            path = %request.uri().path(),
            "Request rate above FAIXA_RATE_LIMIT"
        );
        return deny(StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded");
    }

    if let Some(expected) = &policy.api_key
        && !OPEN_ROUTES.contains(&request.uri().path())
    {
        match presented_key(&request) {
            Some(key) if key_matches(key, expected) => {}
            Some(_) => {
                tracing::warn!(
                    event = "auth_failure",
                    reason = "invalid_api_key",
                    "Authentication failed: invalid API key"
                );
                return deny(StatusCode::UNAUTHORIZED, "invalid API key");
            }
            None => {
                tracing::warn!(
                    event = "auth_failure",
                    reason = "missing_authorization_header",
                    "Missing Authorization header"
                );
                return deny(StatusCode::UNAUTHORIZED, "missing Authorization header");
            }
        }
    }

    next.run(request).await
}

/// Key from the Authorization header, with or without the `Bearer ` scheme.
fn presented_key(request: &Request<Body>) -> Option<&str> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value))
}

/// Constant-time key comparison.
///
/// Both keys are zero-padded to a common width so `ct_eq` always walks the
/// same number of bytes; the separate length check keeps padding from
/// equating keys of different lengths.
fn key_matches(presented: &str, expected: &str) -> bool {
    let width = presented.len().max(expected.len());
    let mut lhs = vec![0u8; width];
    let mut rhs = vec![0u8; width];
    lhs[..presented.len()].copy_from_slice(presented.as_bytes());
    rhs[..expected.len()].copy_from_slice(expected.as_bytes());

    bool::from(lhs.ct_eq(&rhs)) && presented.len() == expected.len()
}

/// Denial response in the API's standard error envelope.
fn deny(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "success": false, "error": message })),
    )
        .into_response()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_matches_exact() {
        assert!(key_matches("secret-key", "secret-key"));
    }

    #[test]
    fn test_key_matches_rejects_wrong_key() {
        assert!(!key_matches("wrong-key!", "secret-key"));
    }

    #[test]
    fn test_key_matches_rejects_prefix_of_expected() {
        // Same bytes up to the padding boundary must not pass.
        assert!(!key_matches("secret", "secret-key"));
        assert!(!key_matches("secret-key-extra", "secret-key"));
    }

    #[test]
    fn test_policy_without_key_is_open() {
        // SAFETY: This is a unit test running in isolation.
        unsafe { std::env::remove_var("FAIXA_API_KEY") };
        let policy = AccessPolicy::from_env();
        assert!(!policy.requires_key());
    }

    #[test]
    fn test_throttle_admits_first_request() {
        let policy = AccessPolicy {
            api_key: None,
            limiter: NonZeroU32::new(50)
                .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps)))),
        };
        assert!(policy.throttled());
        let limiter = policy.limiter.as_ref().expect("limiter configured");
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_zero_rate_limit_disables_throttle() {
        let policy = AccessPolicy {
            api_key: None,
            limiter: NonZeroU32::new(0)
                .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps)))),
        };
        assert!(!policy.throttled());
    }
}
