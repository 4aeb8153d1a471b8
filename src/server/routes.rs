//! Route table and router construction.
//!
//! # Route Structure
//!
//! ```text
//! /                 - Home (name: index)
//! /index/           - Home (name: index)
//! /about/           - About the school
//! /gallery/         - Photo gallery
//! /ministeres/      - Ministries
//! /contact/         - Contact details
//! /evenements/      - Events
//! /health           - Health check
//! /static/...       - Static files (prefix follows STATIC_URL)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ecole_biblique::server::{create_router, AppState, RouterConfig};
//!
//! let state = AppState::new(settings, storage);
//! let router = create_router(state, RouterConfig::default());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router).await?;
//! ```

use axum::{
    middleware,
    routing::{get, MethodRouter},
    Router,
};
use http::header::{self, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    about_handler, contact_handler, evenements_handler, fallback_handler, gallery_handler,
    health_handler, index_handler, ministeres_handler, AppState,
};
use super::middleware::{enforce_allowed_host, enforce_ssl_redirect, enforce_trusted_origin};
use crate::settings::StaticBackend;

// =============================================================================
// Route Table
// =============================================================================

/// Pages served by the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Index,
    About,
    Gallery,
    Ministeres,
    Contact,
    Evenements,
}

/// One entry of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// URL path, always ending with `/`
    pub path: &'static str,

    /// Name used to build links
    pub name: &'static str,

    /// Page rendered for this path
    pub page: Page,
}

/// Every page route, in declaration order.
pub const ROUTES: &[Route] = &[
    Route {
        path: "/",
        name: "index",
        page: Page::Index,
    },
    Route {
        path: "/index/",
        name: "index",
        page: Page::Index,
    },
    Route {
        path: "/about/",
        name: "about",
        page: Page::About,
    },
    Route {
        path: "/gallery/",
        name: "gallery",
        page: Page::Gallery,
    },
    Route {
        path: "/ministeres/",
        name: "ministeres",
        page: Page::Ministeres,
    },
    Route {
        path: "/contact/",
        name: "contact",
        page: Page::Contact,
    },
    Route {
        path: "/evenements/",
        name: "evenements",
        page: Page::Evenements,
    },
];

/// Path of the route called `name`.
///
/// When several routes share a name the last declared one wins, so `index`
/// resolves to `/index/`.
pub fn reverse(name: &str) -> Option<&'static str> {
    ROUTES.iter().rev().find(|r| r.name == name).map(|r| r.path)
}

/// Route whose path is exactly `path`.
pub fn resolve(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.path == path)
}

fn page_method_router(page: Page) -> MethodRouter<AppState> {
    match page {
        Page::Index => get(index_handler),
        Page::About => get(about_handler),
        Page::Gallery => get(gallery_handler),
        Page::Ministeres => get(ministeres_handler),
        Page::Contact => get(contact_handler),
        Page::Evenements => get(evenements_handler),
    }
}

// =============================================================================
// Router Configuration
// =============================================================================

/// Cache-Control for content-hashed static files (one year, immutable).
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Cache-Control for unhashed static files in production.
pub const SHORT_CACHE_CONTROL: &str = "public, max-age=60";

/// Cache-Control for static files while debugging.
pub const NO_CACHE_CONTROL: &str = "no-cache";

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Whether to enable request tracing
    pub enable_tracing: bool,

    /// Whether to mount the static file service
    pub serve_static: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            enable_tracing: true,
            serve_static: true,
        }
    }
}

impl RouterConfig {
    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Enable or disable serving `/static/`.
    pub fn with_static(mut self, enabled: bool) -> Self {
        self.serve_static = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the site router.
///
/// Layers, outermost first: tracing, security headers, allowed-host check,
/// SSL redirect, trusted-origin check.
pub fn create_router(state: AppState, config: RouterConfig) -> Router {
    let settings = state.settings.clone();

    let mut router: Router<AppState> = Router::new();
    for route in ROUTES {
        router = router.route(route.path, page_method_router(route.page));
    }
    router = router
        .route("/health", get(health_handler))
        .fallback(fallback_handler);

    if config.serve_static {
        let mount = settings.static_files.url.trim_end_matches('/').to_string();
        router = router.nest_service(&mount, build_static_router(&state));
    }

    let mut router: Router = router
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            settings.clone(),
            enforce_trusted_origin,
        ))
        .layer(middleware::from_fn_with_state(
            settings.clone(),
            enforce_ssl_redirect,
        ))
        .layer(middleware::from_fn_with_state(
            settings.clone(),
            enforce_allowed_host,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("same-origin"),
        ));

    if settings.security.hsts_seconds > 0 {
        let value = format!("max-age={}; includeSubDomains", settings.security.hsts_seconds);
        if let Ok(value) = HeaderValue::from_str(&value) {
            router = router.layer(SetResponseHeaderLayer::if_not_present(
                header::STRICT_TRANSPORT_SECURITY,
                value,
            ));
        }
    }

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Static file service for the storage location, with compression and
/// caching headers chosen by the backend.
fn build_static_router(state: &AppState) -> Router {
    let settings = &state.settings;
    let backend = settings.static_files.backend;

    let cache_control = if backend == StaticBackend::Manifest {
        IMMUTABLE_CACHE_CONTROL
    } else if settings.debug {
        NO_CACHE_CONTROL
    } else {
        SHORT_CACHE_CONTROL
    };

    let router = Router::new()
        .fallback_service(ServeDir::new(settings.static_location()))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        ));

    if backend.compresses() {
        router.layer(CompressionLayer::new())
    } else {
        router
    }
}

// =============================================================================
// Tests
// =============================================================================
