//! Page routing, gallery rendering and the 404 page.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use ecole_biblique::{reverse, ROUTES};

use super::test_utils::{body_string, gallery_json, get, TestSite};

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_every_route_renders() {
    let site = TestSite::new();

    for route in ROUTES {
        let response = site.local_router().oneshot(get(route.path)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK, "GET {}", route.path);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));

        let html = body_string(response).await;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("École Biblique"));
    }
}

#[tokio::test]
async fn test_root_and_index_render_the_same_page() {
    let site = TestSite::new();

    let root = body_string(site.local_router().oneshot(get("/")).await.unwrap()).await;
    let index = body_string(site.local_router().oneshot(get("/index/")).await.unwrap()).await;

    assert_eq!(root, index);
}

#[tokio::test]
async fn test_navigation_links_use_reversed_paths() {
    let site = TestSite::new();

    let response = site.local_router().oneshot(get("/contact/")).await.unwrap();
    let html = body_string(response).await;

    assert!(html.contains("href=\"/index/\""));
    assert!(html.contains("href=\"/about/\""));
    assert!(html.contains("href=\"/evenements/\""));
    assert!(html.contains("href=\"/static/css/style.css\""));
    assert_eq!(reverse("contact"), Some("/contact/"));
}

#[tokio::test]
async fn test_security_headers_on_pages() {
    let site = TestSite::new();

    let response = site.local_router().oneshot(get("/about/")).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(headers.get(header::REFERRER_POLICY).unwrap(), "same-origin");
    // HSTS is only sent by the production profile
    assert!(headers.get(header::STRICT_TRANSPORT_SECURITY).is_none());
}

// =============================================================================
// Slash Redirects and 404
// =============================================================================

#[tokio::test]
async fn test_missing_trailing_slash_redirects() {
    let site = TestSite::new();

    let response = site.local_router().oneshot(get("/gallery")).await.unwrap();

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/gallery/");
}

#[tokio::test]
async fn test_slash_redirect_keeps_query() {
    let site = TestSite::new();

    let response = site
        .local_router()
        .oneshot(get("/evenements?annee=2024"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/evenements/?annee=2024"
    );
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let site = TestSite::new();

    let response = site.local_router().oneshot(get("/inscriptions/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_string(response).await;
    assert!(html.contains("Page introuvable"));
    assert!(html.contains("/inscriptions/"));
    // Debug mode lists the known routes
    assert!(html.contains("route-list"));
}

#[tokio::test]
async fn test_unknown_path_without_slash_is_not_redirected() {
    let site = TestSite::new();

    let response = site.local_router().oneshot(get("/inscriptions")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_to_page_is_method_not_allowed() {
    let site = TestSite::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/contact/")
        .header("host", "localhost")
        .header("origin", "http://localhost")
        .body(Body::empty())
        .unwrap();
    let response = site.local_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health() {
    let site = TestSite::new();

    let response = site.local_router().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Gallery
// =============================================================================

#[tokio::test]
async fn test_gallery_embeds_images_from_static_tree() {
    let site = TestSite::new();

    let response = site.local_router().oneshot(get("/gallery/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;

    let college: Vec<String> = serde_json::from_str(gallery_json(&html, "college")).unwrap();
    assert_eq!(
        college,
        vec![
            "/static/images/college/2023/c.webp",
            "/static/images/college/a.PNG",
            "/static/images/college/b.jpg",
        ]
    );

    let primaire: Vec<String> =
        serde_json::from_str(gallery_json(&html, "ecole-primaire")).unwrap();
    assert_eq!(primaire, vec!["/static/images/ecolePrimaire/rentree.jpeg"]);

    let empty: Vec<String> =
        serde_json::from_str(gallery_json(&html, "vie-communautaire")).unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_gallery_sees_new_files_without_restart() {
    let site = TestSite::new();
    let router = site.local_router();

    let before = body_string(router.clone().oneshot(get("/gallery/")).await.unwrap()).await;
    let before: Vec<String> =
        serde_json::from_str(gallery_json(&before, "vie-communautaire")).unwrap();
    assert!(before.is_empty());

    site.write("images/gallery/kermesse.gif", b"gif");

    let after = body_string(router.oneshot(get("/gallery/")).await.unwrap()).await;
    let after: Vec<String> =
        serde_json::from_str(gallery_json(&after, "vie-communautaire")).unwrap();
    assert_eq!(after, vec!["/static/images/gallery/kermesse.gif"]);
}

#[tokio::test]
async fn test_gallery_renders_when_images_directory_is_missing() {
    let site = TestSite::new();
    std::fs::remove_dir_all(site.static_dir().join("images")).unwrap();

    let response = site.local_router().oneshot(get("/gallery/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert_eq!(gallery_json(&html, "college"), "[]");
}
