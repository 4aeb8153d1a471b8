//! Shared fixtures for the integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;

use ecole_biblique::{
    collect_static, create_router, create_storage, AppState, CollectReport, RouterConfig,
    Settings, SiteArgs,
};

/// Host header accepted by the local profile.
pub const LOCAL_HOST: &str = "localhost";

/// Public hostname used for production fixtures.
pub const PRODUCTION_HOST: &str = "ecole.onrender.com";

/// A temporary project directory with a `static/` tree.
///
/// ```text
/// static/
///   css/style.css
///   images/college/b.jpg
///   images/college/a.PNG
///   images/college/notes.txt
///   images/college/2023/c.webp
///   images/ecolePrimaire/rentree.jpeg
///   images/gallery/            (empty)
/// ```
pub struct TestSite {
    dir: TempDir,
}

impl TestSite {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let site = Self { dir };

        site.write("css/style.css", b"body { margin: 0; }");
        site.write("images/college/b.jpg", b"jpeg-b");
        site.write("images/college/a.PNG", b"png-a");
        site.write("images/college/notes.txt", b"not an image");
        site.write("images/college/2023/c.webp", b"webp-c");
        site.write("images/ecolePrimaire/rentree.jpeg", b"jpeg-rentree");
        fs::create_dir_all(site.static_dir().join("images/gallery")).unwrap();

        site
    }

    pub fn base_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn static_dir(&self) -> PathBuf {
        self.base_dir().join("static")
    }

    pub fn collected_dir(&self) -> PathBuf {
        self.base_dir().join("staticfiles")
    }

    /// Write a file under `static/`, creating parent directories.
    pub fn write(&self, relative: &str, content: &[u8]) {
        let path = self.static_dir().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn local_settings(&self) -> Settings {
        Settings::local(self.base_dir())
    }

    pub fn production_settings(&self) -> Settings {
        let args = SiteArgs {
            base_dir: self.base_dir().to_path_buf(),
            secret_key: Some("integration-secret".to_string()),
            database_url: Some("postgres://site:pw@db.internal:5432/ecole".to_string()),
            external_hostname: Some(PRODUCTION_HOST.to_string()),
            ..SiteArgs::default()
        };
        let settings = Settings::from_args(&args).unwrap();
        settings.validate().unwrap();
        settings
    }

    /// Run collectstatic from `static/` into `staticfiles/`.
    pub fn collect(&self, hashed: bool) -> CollectReport {
        collect_static(&[self.static_dir()], &self.collected_dir(), hashed, false).unwrap()
    }

    /// Router over the production profile, after collecting hashed files.
    pub fn production_router(&self) -> Router {
        self.collect(true);
        router_for(self.production_settings())
    }

    /// Router over the local profile, static files read from `static/`.
    pub fn local_router(&self) -> Router {
        router_for(self.local_settings())
    }
}

/// Router for `settings` with tracing off.
pub fn router_for(settings: Settings) -> Router {
    let storage = create_storage(&settings).unwrap();
    create_router(
        AppState::new(settings, storage),
        RouterConfig::default().with_tracing(false),
    )
}

/// GET request for `uri` with the given Host header.
pub fn get_with_host(uri: &str, host: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("host", host)
        .body(Body::empty())
        .unwrap()
}

/// GET request for `uri` as seen by the local profile.
pub fn get(uri: &str) -> Request<Body> {
    get_with_host(uri, LOCAL_HOST)
}

/// Collect a response body as UTF-8.
pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Text of the `<script data-gallery-source="slug">` element in a gallery page.
pub fn gallery_json<'a>(html: &'a str, slug: &str) -> &'a str {
    let marker = format!("data-gallery-source=\"{}\">", slug);
    let start = html.find(&marker).unwrap() + marker.len();
    let end = start + html[start..].find("</script>").unwrap();
    &html[start..end]
}
