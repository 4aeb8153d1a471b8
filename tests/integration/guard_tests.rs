//! Host validation, trusted-origin checks and the HTTPS redirect.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use tower::ServiceExt;

use super::test_utils::{body_string, get, get_with_host, TestSite, PRODUCTION_HOST};

fn post(uri: &str, host: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("host", host)
}

fn https_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("host", PRODUCTION_HOST)
        .header("x-forwarded-proto", "https")
        .body(Body::empty())
        .unwrap()
}

// =============================================================================
// Allowed Hosts
// =============================================================================

#[tokio::test]
async fn test_local_hosts_accepted_with_port() {
    let site = TestSite::new();

    for host in ["localhost:8000", "127.0.0.1", "[::1]:8000"] {
        let response = site
            .local_router()
            .oneshot(get_with_host("/", host))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "host {}", host);
    }
}

#[tokio::test]
async fn test_unknown_host_is_bad_request() {
    let site = TestSite::new();

    let response = site
        .local_router()
        .oneshot(get_with_host("/", "attacker.example"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("Bad Request (400)"));
}

#[tokio::test]
async fn test_missing_host_is_bad_request() {
    let site = TestSite::new();

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = site.local_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_host_checked_before_https_redirect() {
    let site = TestSite::new();

    let response = site
        .production_router()
        .oneshot(get_with_host("/about/", "localhost"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Trusted Origins
// =============================================================================

#[tokio::test]
async fn test_post_from_foreign_origin_is_forbidden() {
    let site = TestSite::new();

    let request = post("/contact/", "localhost")
        .header(header::ORIGIN, "https://attacker.example")
        .body(Body::empty())
        .unwrap();
    let response = site.local_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(body_string(response).await.contains("Forbidden (403)"));
}

#[tokio::test]
async fn test_post_without_origin_or_referer_is_forbidden() {
    let site = TestSite::new();

    let request = post("/contact/", "localhost").body(Body::empty()).unwrap();
    let response = site.local_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_post_with_trusted_referer_passes_the_check() {
    let site = TestSite::new();

    // The dev server origin differs from the request host, so only the
    // trusted-origin list can accept it
    let request = post("/contact/", "127.0.0.1")
        .header(header::REFERER, "http://localhost:8000/contact/")
        .body(Body::empty())
        .unwrap();
    let response = site.local_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_post_with_explicit_default_port_matches_own_origin() {
    let site = TestSite::new();

    let request = post("/contact/", "localhost:80")
        .header(header::ORIGIN, "http://localhost")
        .body(Body::empty())
        .unwrap();
    let response = site.local_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_production_post_from_own_https_origin_passes_the_check() {
    let site = TestSite::new();

    let request = post("/contact/", PRODUCTION_HOST)
        .header("x-forwarded-proto", "https")
        .header(header::ORIGIN, format!("https://{}", PRODUCTION_HOST))
        .body(Body::empty())
        .unwrap();
    let response = site.production_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_production_post_from_plain_http_origin_is_forbidden() {
    let site = TestSite::new();

    let request = post("/contact/", PRODUCTION_HOST)
        .header("x-forwarded-proto", "https")
        .header(header::ORIGIN, format!("http://{}", PRODUCTION_HOST))
        .body(Body::empty())
        .unwrap();
    let response = site.production_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// HTTPS Redirect
// =============================================================================

#[tokio::test]
async fn test_production_redirects_plain_http() {
    let site = TestSite::new();

    let response = site
        .production_router()
        .oneshot(get_with_host("/gallery/?page=2", PRODUCTION_HOST))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://ecole.onrender.com/gallery/?page=2"
    );
}

#[tokio::test]
async fn test_production_serves_forwarded_https() {
    let site = TestSite::new();

    let response = site
        .production_router()
        .oneshot(https_get("/about/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let hsts = response
        .headers()
        .get(header::STRICT_TRANSPORT_SECURITY)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(hsts.starts_with("max-age=31536000"));
}

#[tokio::test]
async fn test_production_health_is_not_redirected() {
    let site = TestSite::new();

    let response = site
        .production_router()
        .oneshot(get_with_host("/health", PRODUCTION_HOST))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_local_profile_never_redirects() {
    let site = TestSite::new();

    let response = site.local_router().oneshot(get("/about/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_production_not_found_hides_routes() {
    let site = TestSite::new();

    let response = site
        .production_router()
        .oneshot(https_get("/inscriptions/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_string(response).await;
    assert!(html.contains("Page introuvable"));
    assert!(!html.contains("route-list"));
}
