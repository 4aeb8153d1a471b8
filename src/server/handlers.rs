//! HTTP request handlers for the site.
//!
//! # Endpoints
//!
//! - `GET /`, `/index/`, `/about/`, `/gallery/`, `/ministeres/`, `/contact/`, `/evenements/` - Pages
//! - `GET /health` - Health check endpoint
//! - anything else - slash-appending redirect or 404 page

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};

use super::middleware::moved_permanently;
use super::pages;
use super::routes::{resolve, Page};
use crate::settings::Settings;
use crate::storage::StaticStorage;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state passed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Resolved deployment settings
    pub settings: Arc<Settings>,

    /// Static file storage used by templates and the gallery
    pub storage: Arc<dyn StaticStorage>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(settings: Settings, storage: Arc<dyn StaticStorage>) -> Self {
        Self {
            settings: Arc::new(settings),
            storage,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Page Handlers
// =============================================================================

fn render(page: Page, state: &AppState) -> Html<String> {
    Html(pages::render_page(page, state).into_string())
}

/// Home page.
pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    render(Page::Index, &state)
}

/// About page.
pub async fn about_handler(State(state): State<AppState>) -> Html<String> {
    render(Page::About, &state)
}

/// Gallery page. Image lists are collected fresh on every request.
///
/// Collecting walks the static storage with blocking filesystem calls, so the
/// page is rendered on the blocking thread pool.
pub async fn gallery_handler(State(state): State<AppState>) -> Response {
    match tokio::task::spawn_blocking(move || render(Page::Gallery, &state)).await {
        Ok(page) => page.into_response(),
        Err(e) => {
            error!(error = %e, "Gallery rendering task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Ministries page.
pub async fn ministeres_handler(State(state): State<AppState>) -> Html<String> {
    render(Page::Ministeres, &state)
}

/// Contact page.
pub async fn contact_handler(State(state): State<AppState>) -> Html<String> {
    render(Page::Contact, &state)
}

/// Events page.
pub async fn evenements_handler(State(state): State<AppState>) -> Html<String> {
    render(Page::Evenements, &state)
}

/// Health check handler.
///
/// Returns 200 OK with service status. Exempt from SSL redirect so platform
/// probes over plain HTTP succeed.
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle every path the route table does not know.
///
/// A `GET` or `HEAD` for `/about` is redirected permanently to `/about/` when
/// the slashed path is a route, keeping the query string. Everything else
/// gets the 404 page.
pub async fn fallback_handler(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let path = uri.path();

    if (method == Method::GET || method == Method::HEAD) && !path.ends_with('/') {
        let slashed = format!("{}/", path);
        if resolve(&slashed).is_some() {
            let target = match uri.query() {
                Some(query) => format!("{}?{}", slashed, query),
                None => slashed,
            };
            debug!(from = %path, to = %target, "Appending slash");
            return moved_permanently(target);
        }
    }

    debug!(path = %path, "Page not found");
    let body = pages::not_found(path, &state).into_string();
    (StatusCode::NOT_FOUND, Html(body)).into_response()
}

// =============================================================================
// Tests
// =============================================================================
