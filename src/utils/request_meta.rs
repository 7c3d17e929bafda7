//! Client metadata extraction from HTTP headers.
//!
//! Audit events record where a request came from; these helpers pull the
//! relevant headers and degrade to `None` when they are absent or malformed.

use axum::http::HeaderMap;

use crate::application::services::AuthContext;
use crate::domain::audit_event::RequestMeta;

/// Extracts the client IP.
///
/// Prefers `X-Forwarded-For` (first hop) over `X-Real-IP`, matching a
/// deployment behind a reverse proxy. Without either header there is no
/// trustworthy client address at this layer.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            let first = value.split(',').next().unwrap_or("").trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Extracts the `User-Agent` header.
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Extracts the request correlation id.
///
/// Accepts `x-correlation-id` or the common `x-request-id` fallback.
pub fn correlation_id(headers: &HeaderMap) -> Option<String> {
    for name in ["x-correlation-id", "x-request-id"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Builds the [`RequestMeta`] passed into services for audit emission.
pub fn request_meta(ctx: &AuthContext, headers: &HeaderMap) -> RequestMeta {
    RequestMeta {
        actor_id: ctx.subject.clone(),
        ip_address: client_ip(headers),
        user_agent: user_agent(headers),
        correlation_id: correlation_id(headers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_client_ip_prefers_first_forwarded_hop() {
        let map = headers(&[
            ("x-forwarded-for", "203.0.113.5, 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]);
        assert_eq!(client_ip(&map).as_deref(), Some("203.0.113.5"));
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let map = headers(&[("x-real-ip", "198.51.100.7")]);
        assert_eq!(client_ip(&map).as_deref(), Some("198.51.100.7"));
    }

    #[test]
    fn test_client_ip_missing() {
        assert!(client_ip(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_correlation_id_accepts_both_headers() {
        let map = headers(&[("x-request-id", "req-7")]);
        assert_eq!(correlation_id(&map).as_deref(), Some("req-7"));

        let map = headers(&[("x-correlation-id", "corr-1"), ("x-request-id", "req-7")]);
        assert_eq!(correlation_id(&map).as_deref(), Some("corr-1"));
    }

    #[test]
    fn test_user_agent() {
        let map = headers(&[("user-agent", "curl/8.4")]);
        assert_eq!(user_agent(&map).as_deref(), Some("curl/8.4"));
    }
}
