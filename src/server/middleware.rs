//! Request guards applied to the whole router.
//!
//! - [`enforce_allowed_host`] rejects requests whose `Host` is not listed in
//!   the allowed hosts (400).
//! - [`enforce_ssl_redirect`] sends plain-HTTP requests to HTTPS when the
//!   production profile asks for it (301).
//! - [`enforce_trusted_origin`] rejects unsafe methods whose `Origin` (or
//!   `Referer`) is neither the site itself nor a trusted origin (403).

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use tracing::{debug, warn};
use url::Url;

use crate::settings::Settings;

/// Header set by the platform proxy with the client-facing scheme.
pub const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Paths never redirected to HTTPS.
pub const SSL_REDIRECT_EXEMPT: &[&str] = &["/health"];

// =============================================================================
// Rejections
// =============================================================================

/// Why a request was refused before reaching a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestRejection {
    /// Host header missing or not allowed
    DisallowedHost { host: String },

    /// Unsafe method from an untrusted or unknown origin
    UntrustedOrigin { origin: Option<String> },
}

impl std::fmt::Display for RequestRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestRejection::DisallowedHost { host } => {
                write!(f, "Invalid HTTP_HOST header: '{}'", host)
            }
            RequestRejection::UntrustedOrigin { origin: Some(origin) } => {
                write!(f, "Origin checking failed - {} does not match any trusted origins", origin)
            }
            RequestRejection::UntrustedOrigin { origin: None } => {
                write!(f, "Origin checking failed - no Origin or Referer header")
            }
        }
    }
}

impl IntoResponse for RequestRejection {
    fn into_response(self) -> Response {
        let (status, title) = match &self {
            RequestRejection::DisallowedHost { .. } => (StatusCode::BAD_REQUEST, "Bad Request (400)"),
            RequestRejection::UntrustedOrigin { .. } => (StatusCode::FORBIDDEN, "Forbidden (403)"),
        };

        warn!(status = status.as_u16(), "Request rejected: {}", self);

        let body = format!(
            "<!DOCTYPE html><html lang=\"fr\"><head><title>{title}</title></head><body><h1>{title}</h1></body></html>"
        );
        (status, Html(body)).into_response()
    }
}

/// `301 Moved Permanently` to `location`.
pub fn moved_permanently(location: String) -> Response {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

// =============================================================================
// Host Validation
// =============================================================================

/// Host of the request as sent (port included), lowercased.
fn request_host(headers: &HeaderMap, request: &Request) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .map(|h| h.to_ascii_lowercase())
}

/// Drop a trailing `:port` while keeping bracketed IPv6 literals intact.
pub fn split_host_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Whether `host` (with or without port) matches one of the `allowed` patterns.
///
/// `*` matches everything, `.example.org` matches `example.org` and any
/// subdomain, anything else must match exactly (case-insensitively).
pub fn is_host_allowed(host: &str, allowed: &[String]) -> bool {
    let domain = split_host_port(host).trim_end_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }

    allowed.iter().any(|pattern| {
        let pattern = pattern.to_ascii_lowercase();
        if pattern == "*" {
            true
        } else if let Some(base) = pattern.strip_prefix('.') {
            domain == base || domain.ends_with(&pattern)
        } else {
            domain == pattern
        }
    })
}

/// Reject requests for hosts the site does not serve.
pub async fn enforce_allowed_host(
    State(settings): State<Arc<Settings>>,
    request: Request,
    next: Next,
) -> Result<Response, RequestRejection> {
    let host = request_host(request.headers(), &request).unwrap_or_default();
    if !is_host_allowed(&host, &settings.allowed_hosts) {
        return Err(RequestRejection::DisallowedHost { host });
    }
    Ok(next.run(request).await)
}

// =============================================================================
// SSL Redirect
// =============================================================================

/// Whether the client reached the proxy over HTTPS.
fn is_secure(headers: &HeaderMap, request: &Request, trust_forwarded_proto: bool) -> bool {
    if trust_forwarded_proto {
        if let Some(proto) = headers.get(FORWARDED_PROTO).and_then(|v| v.to_str().ok()) {
            return proto
                .split(',')
                .next()
                .is_some_and(|p| p.trim().eq_ignore_ascii_case("https"));
        }
    }
    request.uri().scheme_str() == Some("https")
}

/// Redirect plain-HTTP requests to HTTPS when enabled.
pub async fn enforce_ssl_redirect(
    State(settings): State<Arc<Settings>>,
    request: Request,
    next: Next,
) -> Response {
    let security = &settings.security;
    if !security.ssl_redirect
        || SSL_REDIRECT_EXEMPT.contains(&request.uri().path())
        || is_secure(request.headers(), &request, security.trust_forwarded_proto)
    {
        return next.run(request).await;
    }

    let host = request_host(request.headers(), &request).unwrap_or_default();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("https://{}{}", host, path_and_query);
    debug!(to = %target, "Redirecting to HTTPS");
    moved_permanently(target)
}

// =============================================================================
// Origin Check
// =============================================================================

/// Methods that cannot change state and skip the origin check.
fn is_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// `scheme://host[:port]` of an Origin or Referer value.
///
/// The port is dropped when it is the scheme's default, so `https://a:443`
/// and `https://a` compare equal.
pub fn origin_of(value: &str) -> Option<String> {
    let url = Url::parse(value).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Reject unsafe requests that do not come from the site or a trusted origin.
pub async fn enforce_trusted_origin(
    State(settings): State<Arc<Settings>>,
    request: Request,
    next: Next,
) -> Result<Response, RequestRejection> {
    if is_safe_method(request.method()) {
        return Ok(next.run(request).await);
    }

    let headers = request.headers();
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .and_then(origin_of)
        .or_else(|| {
            headers
                .get(header::REFERER)
                .and_then(|v| v.to_str().ok())
                .and_then(origin_of)
        });

    let Some(origin) = origin else {
        return Err(RequestRejection::UntrustedOrigin { origin: None });
    };

    let scheme = if is_secure(headers, &request, settings.security.trust_forwarded_proto) {
        "https"
    } else {
        "http"
    };
    let own_origin = request_host(headers, &request)
        .and_then(|h| origin_of(&format!("{}://{}", scheme, h)));

    let trusted = own_origin.as_deref() == Some(origin.as_str())
        || settings
            .csrf_trusted_origins
            .iter()
            .filter_map(|t| origin_of(t))
            .any(|t| t.eq_ignore_ascii_case(&origin));

    if !trusted {
        return Err(RequestRejection::UntrustedOrigin {
            origin: Some(origin),
        });
    }

    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
