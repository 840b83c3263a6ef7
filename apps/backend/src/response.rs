//! Cache-aware JSON responses.
//!
//! Successful proxy responses are cacheable by a CDN: `s-maxage` is the
//! route's revalidation window and `stale-while-revalidate` is twice that.

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Revalidation window of a route, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    s_maxage: u32,
}

impl CachePolicy {
    /// Detail pages and popular listings: one hour.
    pub const DETAIL: CachePolicy = CachePolicy::new(3600);
    /// Trending lists and search: thirty minutes.
    pub const TRENDING: CachePolicy = CachePolicy::new(1800);

    pub const fn new(s_maxage: u32) -> Self {
        Self { s_maxage }
    }

    pub fn s_maxage(&self) -> u32 {
        self.s_maxage
    }

    pub fn stale_while_revalidate(&self) -> u32 {
        self.s_maxage.saturating_mul(2)
    }

    /// Value of the `Cache-Control` header.
    pub fn header_value(&self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            self.s_maxage,
            self.stale_while_revalidate()
        )
    }
}

/// JSON body sent with CDN cache headers.
#[derive(Debug)]
pub struct Cached<T> {
    pub policy: CachePolicy,
    pub body: T,
}

impl<T> Cached<T> {
    pub fn new(policy: CachePolicy, body: T) -> Self {
        Self { policy, body }
    }
}

impl<T: Serialize> IntoResponse for Cached<T> {
    fn into_response(self) -> Response {
        let mut response = Json(self.body).into_response();

        // Serialization failures come back as a 500 without cache headers
        if response.status().is_success() {
            let headers = response.headers_mut();
            if let Ok(value) = HeaderValue::from_str(&self.policy.header_value()) {
                headers.insert(header::CACHE_CONTROL, value);
            }
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }

        response
    }
}
