//! HTTP client module
//!
//! Provides the HTTP client used to talk to the management API.
//!
//! # Features
//!
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Authentication**: Integration with auth module
//! - **Error Classification**: 429, 4xx/5xx and timeouts map to distinct errors
//!
//! Requests are never retried. A failed request surfaces to the caller,
//! which decides whether the whole run is worth repeating.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
