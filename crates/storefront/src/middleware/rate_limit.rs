//! Rate limiting middleware using governor and `tower_governor`.
//!
//! - `auth_rate_limiter`: login and registration forms (~10/min per IP)
//! - `api_rate_limiter`: JSON and promo endpoints (~100/min per IP)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor that trusts proxy headers first (Cloudflare, then
/// `X-Forwarded-For`, `X-Real-IP`, Fly.io) and falls back to the peer
/// address of the connection.
#[derive(Clone, Copy)]
pub struct CloudflareIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for CloudflareIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // Try CF-Connecting-IP first (Cloudflare's real client IP)
        if let Some(ip) = headers
            .get("cf-connecting-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // Try X-Forwarded-For (first IP in the chain)
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // Try X-Real-IP
        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // Try Fly-Client-IP (Fly.io's header)
        if let Some(ip) = headers
            .get("fly-client-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
///
/// Keyed by [`CloudflareIpKeyExtractor`].
pub type RateLimiterLayer =
    GovernorLayer<CloudflareIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// One token every 6 seconds, burst of 5.
///
/// # Panics
///
/// Never: both quota values are positive constants.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(CloudflareIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Create rate limiter for general API: ~100 requests per minute per IP.
///
/// One token per second, burst of 50.
///
/// # Panics
///
/// Never: both quota values are positive constants.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(CloudflareIpKeyExtractor)
        .per_second(1)
        .burst_size(50)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(50) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request() -> axum::http::request::Builder {
        Request::builder().uri("/login")
    }

    #[test]
    fn test_cloudflare_header_wins() {
        let req = request()
            .header("cf-connecting-ip", "203.0.113.7")
            .header("x-forwarded-for", "198.51.100.1")
            .body(())
            .unwrap();
        let ip = CloudflareIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip.to_string(), "203.0.113.7");
    }

    #[test]
    fn test_first_forwarded_address() {
        let req = request()
            .header("x-forwarded-for", "198.51.100.1, 10.0.0.1")
            .body(())
            .unwrap();
        let ip = CloudflareIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip.to_string(), "198.51.100.1");
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut req = request().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 4], 5555))));
        let ip = CloudflareIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip.to_string(), "192.0.2.4");
    }

    #[test]
    fn test_no_address_is_an_error() {
        let req = request().body(()).unwrap();
        assert!(CloudflareIpKeyExtractor.extract(&req).is_err());
    }
}
