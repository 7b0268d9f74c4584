//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the login route is limited (~10/min per client IP) to slow down
//! password guessing.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers consulted, in order, when the proxy is trusted.
const FORWARDED_HEADERS: &[&str] = &["x-forwarded-for", "x-real-ip"];

/// Key extractor: the TCP peer, or the proxy-reported client IP when
/// `trust_forwarded` is set.
///
/// The peer is only available when the server is started with
/// `into_make_service_with_connect_info::<SocketAddr>()`. Forwarded headers
/// are client-controlled unless a proxy overwrites them, so they are ignored
/// by default.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientIpKeyExtractor {
    trust_forwarded: bool,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub const fn new(trust_forwarded: bool) -> Self {
        Self { trust_forwarded }
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    FORWARDED_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.trust_forwarded
            && let Some(ip) = forwarded_ip(req.headers())
        {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for the login endpoint: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
/// `trust_forwarded` comes from `SHOPKART_TRUSTED_PROXY`.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(trust_forwarded: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_forwarded))
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}
