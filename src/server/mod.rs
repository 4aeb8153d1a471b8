//! HTTP server layer for the site.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │     GET /, /about/, /gallery/, ... , /static/..., /health       │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌────────────┐  ┌─────────┐  │
//! │  │  handlers   │  │ middleware  │  │   routes   │  │  pages  │  │
//! │  │ (requests)  │  │ (host/csrf) │  │  (table)   │  │ (maud)  │  │
//! │  └─────────────┘  └─────────────┘  └────────────┘  └─────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod routes;

pub use handlers::{
    about_handler, contact_handler, evenements_handler, fallback_handler, gallery_handler,
    health_handler, index_handler, ministeres_handler, AppState, HealthResponse,
};
pub use middleware::{
    enforce_allowed_host, enforce_ssl_redirect, enforce_trusted_origin, is_host_allowed,
    RequestRejection,
};
pub use pages::{GallerySection, GALLERY_SECTIONS};
pub use routes::{create_router, resolve, reverse, Page, Route, RouterConfig, ROUTES};
