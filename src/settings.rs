//! Deployment settings.
//!
//! Resolves the raw [`SiteArgs`] into one of two profiles:
//!
//! - **Local**: debug on, SQLite, loopback hosts, plain static files served
//!   straight from the `static/` source directory.
//! - **Production**: selected when a `DATABASE_URL` is present or the hosting
//!   platform flag is set. Postgres over TLS, platform hostname, secure
//!   cookies, SSL redirect behind the proxy and hashed static files served
//!   from the collected `staticfiles/` root.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::config::SiteArgs;
use crate::error::ConfigError;

/// Key used by the local profile when no `SECRET_KEY` is given.
pub const DEV_SECRET_KEY: &str = "dev-secret-key-do-not-use-in-prod";

/// Hosts accepted by the local profile.
pub const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "[::1]", "0.0.0.0"];

/// Name of the SQLite file used by the local profile.
pub const SQLITE_FILE: &str = "db.sqlite3";

/// Directory holding static sources, relative to the base directory.
pub const STATIC_SOURCE_DIR: &str = "static";

/// Directory static files are collected into, relative to the base directory.
pub const STATIC_ROOT_DIR: &str = "staticfiles";

/// HSTS max-age used when SSL redirect is on (one year).
pub const HSTS_SECONDS: u64 = 31_536_000;

/// Persistent connection lifetime for the production database, in seconds.
pub const DB_CONN_MAX_AGE: u64 = 600;

// =============================================================================
// Settings Types
// =============================================================================

/// Which deployment the process is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Local,
    Production,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Local => write!(f, "local"),
            Profile::Production => write!(f, "production"),
        }
    }
}

/// Database selected for the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// Local SQLite file.
    Sqlite { path: PathBuf },

    /// Remote Postgres reached over TLS.
    Postgres {
        url: Url,
        conn_max_age: u64,
        ssl_require: bool,
    },
}

impl DatabaseConfig {
    /// Parse a `DATABASE_URL`, forcing `sslmode=require` unless the URL sets one.
    pub fn from_url(raw: &str) -> Result<Self, ConfigError> {
        let mut url = Url::parse(raw).map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;

        match url.scheme() {
            "postgres" | "postgresql" => {}
            other => return Err(ConfigError::UnsupportedDatabase(other.to_string())),
        }

        let has_sslmode = url.query_pairs().any(|(k, _)| k == "sslmode");
        if !has_sslmode {
            url.query_pairs_mut().append_pair("sslmode", "require");
        }

        Ok(DatabaseConfig::Postgres {
            url,
            conn_max_age: DB_CONN_MAX_AGE,
            ssl_require: true,
        })
    }

    /// Human-readable description with any password masked.
    pub fn describe(&self) -> String {
        match self {
            DatabaseConfig::Sqlite { path } => format!("sqlite ({})", path.display()),
            DatabaseConfig::Postgres { url, .. } => {
                let mut shown = url.clone();
                if shown.password().is_some() {
                    // set_password only fails for cannot-be-a-base URLs, which postgres URLs are not
                    let _ = shown.set_password(Some("****"));
                }
                format!("postgres ({})", shown)
            }
        }
    }
}

/// How static files are stored and addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticBackend {
    /// Files served as-is.
    Plain,

    /// Files served as-is with gzip response compression.
    Compressed,

    /// Content-hashed names from `staticfiles.json`, with gzip response compression.
    Manifest,
}

impl StaticBackend {
    /// Parse a backend name as accepted by `STATIC_BACKEND`.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(StaticBackend::Plain),
            "compressed" => Ok(StaticBackend::Compressed),
            "manifest" | "compressed-manifest" => Ok(StaticBackend::Manifest),
            _ => Err(ConfigError::UnknownStaticBackend(name.to_string())),
        }
    }

    /// Whether responses should be gzip-compressed.
    pub fn compresses(&self) -> bool {
        !matches!(self, StaticBackend::Plain)
    }
}

impl fmt::Display for StaticBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticBackend::Plain => write!(f, "plain"),
            StaticBackend::Compressed => write!(f, "compressed"),
            StaticBackend::Manifest => write!(f, "manifest"),
        }
    }
}

/// Static file layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSettings {
    /// Public URL prefix, e.g. `/static/`
    pub url: String,

    /// Directories holding the static sources
    pub source_dirs: Vec<PathBuf>,

    /// Directory the sources are collected into
    pub root: PathBuf,

    /// Storage backend
    pub backend: StaticBackend,
}

/// Transport security switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecuritySettings {
    /// Redirect plain HTTP requests to HTTPS
    pub ssl_redirect: bool,

    /// Trust `X-Forwarded-Proto` from the platform proxy
    pub trust_forwarded_proto: bool,

    /// Mark the session cookie secure
    pub session_cookie_secure: bool,

    /// Mark the CSRF cookie secure
    pub csrf_cookie_secure: bool,

    /// Strict-Transport-Security max-age, 0 disables the header
    pub hsts_seconds: u64,
}

/// Fully resolved settings for one process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub profile: Profile,
    pub debug: bool,
    pub secret_key: Option<String>,
    pub base_dir: PathBuf,
    pub allowed_hosts: Vec<String>,
    pub csrf_trusted_origins: Vec<String>,
    pub database: DatabaseConfig,
    pub security: SecuritySettings,
    pub static_files: StaticSettings,
    pub language_code: String,
    pub time_zone: String,
}

// =============================================================================
// Resolution
// =============================================================================

impl Settings {
    /// Resolve settings from command-line and environment values.
    pub fn from_args(args: &SiteArgs) -> Result<Self, ConfigError> {
        let on_platform = args
            .platform
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty());
        let database_url = args
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let profile = if on_platform || database_url.is_some() {
            Profile::Production
        } else {
            Profile::Local
        };

        let database = match database_url {
            Some(raw) => DatabaseConfig::from_url(raw)?,
            None => DatabaseConfig::Sqlite {
                path: args.base_dir.join(SQLITE_FILE),
            },
        };

        let backend = match &args.static_backend {
            Some(name) => StaticBackend::parse(name)?,
            None => match profile {
                Profile::Local => StaticBackend::Plain,
                Profile::Production => StaticBackend::Manifest,
            },
        };

        Ok(Self::assemble(args, profile, database, backend))
    }

    /// Build the settings of `profile` once the fallible inputs are resolved.
    fn assemble(
        args: &SiteArgs,
        profile: Profile,
        database: DatabaseConfig,
        backend: StaticBackend,
    ) -> Self {
        let base_dir = args.base_dir.clone();

        let static_files = StaticSettings {
            url: args.static_url.clone(),
            source_dirs: vec![base_dir.join(STATIC_SOURCE_DIR)],
            root: base_dir.join(STATIC_ROOT_DIR),
            backend,
        };

        match profile {
            Profile::Local => {
                let allowed_hosts = merge_unique(
                    LOCAL_HOSTS.iter().map(|h| h.to_string()),
                    args.allowed_hosts.iter().cloned(),
                );
                let local_origins = LOCAL_HOSTS
                    .iter()
                    .filter(|h| !h.starts_with('['))
                    .map(|h| format!("http://{}:{}", h, args.port));
                Settings {
                    profile,
                    debug: args.debug.unwrap_or(true),
                    secret_key: Some(
                        args.secret_key
                            .clone()
                            .unwrap_or_else(|| DEV_SECRET_KEY.to_string()),
                    ),
                    base_dir,
                    allowed_hosts,
                    csrf_trusted_origins: merge_unique(
                        local_origins,
                        args.csrf_trusted_origins.iter().cloned(),
                    ),
                    database,
                    security: SecuritySettings {
                        ssl_redirect: false,
                        trust_forwarded_proto: false,
                        session_cookie_secure: false,
                        csrf_cookie_secure: false,
                        hsts_seconds: 0,
                    },
                    static_files,
                    language_code: "fr-fr".to_string(),
                    time_zone: "Europe/Paris".to_string(),
                }
            }
            Profile::Production => {
                let allowed_hosts = merge_unique(
                    args.external_hostname.iter().cloned(),
                    args.allowed_hosts.iter().cloned(),
                );
                let host_origins: Vec<String> = allowed_hosts
                    .iter()
                    .filter(|h| h.as_str() != "*")
                    .map(|h| format!("https://{}", h.trim_start_matches('.')))
                    .collect();
                Settings {
                    profile,
                    debug: args.debug.unwrap_or(false),
                    secret_key: args.secret_key.clone().filter(|k| !k.is_empty()),
                    base_dir,
                    allowed_hosts,
                    csrf_trusted_origins: merge_unique(
                        host_origins,
                        args.csrf_trusted_origins.iter().cloned(),
                    ),
                    database,
                    security: SecuritySettings {
                        ssl_redirect: true,
                        trust_forwarded_proto: true,
                        session_cookie_secure: true,
                        csrf_cookie_secure: true,
                        hsts_seconds: HSTS_SECONDS,
                    },
                    static_files,
                    language_code: "fr-fr".to_string(),
                    time_zone: "Europe/Paris".to_string(),
                }
            }
        }
    }

    /// Local development settings rooted at `base_dir`.
    pub fn local(base_dir: impl Into<PathBuf>) -> Self {
        let args = SiteArgs {
            base_dir: base_dir.into(),
            ..SiteArgs::default()
        };
        let database = DatabaseConfig::Sqlite {
            path: args.base_dir.join(SQLITE_FILE),
        };
        Self::assemble(&args, Profile::Local, database, StaticBackend::Plain)
    }

    /// Validate the resolved settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profile == Profile::Production && self.secret_key.is_none() {
            return Err(ConfigError::MissingSecretKey);
        }

        if self.profile == Profile::Production && self.allowed_hosts.is_empty() {
            return Err(ConfigError::NoAllowedHosts);
        }

        let url = &self.static_files.url;
        if url.len() < 2 || !url.starts_with('/') || !url.ends_with('/') {
            return Err(ConfigError::InvalidStaticUrl(url.clone()));
        }

        Ok(())
    }

    /// Directory the static storage reads from and `/static/` serves.
    ///
    /// The local plain and compressed backends read the sources directly so no
    /// collect step is needed during development; everything else reads the
    /// collected root.
    pub fn static_location(&self) -> &Path {
        match (self.profile, self.static_files.backend) {
            (Profile::Local, StaticBackend::Plain | StaticBackend::Compressed) => self
                .static_files
                .source_dirs
                .first()
                .map(PathBuf::as_path)
                .unwrap_or(self.static_files.root.as_path()),
            _ => self.static_files.root.as_path(),
        }
    }
}

/// Concatenate two host/origin lists, dropping empties and duplicates while keeping order.
fn merge_unique(
    first: impl IntoIterator<Item = String>,
    second: impl IntoIterator<Item = String>,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in first.into_iter().chain(second) {
        let item = item.trim().to_string();
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
