//! # École Biblique
//!
//! Server-rendered website of the École Biblique: a handful of informational
//! pages and a photo gallery fed from the static files.
//!
//! ## Architecture
//!
//! - [`config`] - CLI and environment arguments
//! - [`settings`] - Local/production profile resolution
//! - [`storage`] - Static file storage backends and `collectstatic`
//! - [`gallery`] - Image discovery behind the gallery page
//! - [`server`] - Axum router, pages and request guards
//!
//! ## Example
//!
//! ```rust,no_run
//! use ecole_biblique::{create_router, create_storage, AppState, RouterConfig, Settings};
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = Settings::local(".");
//!     let storage = create_storage(&settings).expect("static storage");
//!     let router = create_router(AppState::new(settings, storage), RouterConfig::default());
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod gallery;
pub mod server;
pub mod settings;
pub mod storage;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, CollectStaticConfig, Command, ServeConfig, SiteArgs};
pub use error::{CollectError, ConfigError, StorageError};
pub use gallery::{image_urls, images_in, is_image_file, IMAGE_EXTENSIONS};
pub use server::{
    create_router, health_handler, reverse, AppState, HealthResponse, Page, RouterConfig, ROUTES,
};
pub use settings::{DatabaseConfig, Profile, Settings, StaticBackend};
pub use storage::{
    collect_static, create_storage, CollectReport, FileSystemStorage, Listing, ManifestStorage,
    StaticStorage,
};
