//! Command-line and environment configuration for the site.
//!
//! Every option can be given as a flag or through the environment, which is
//! how the hosting platform configures the production deployment:
//!
//! - `BASE_DIR` - Project directory holding `static/` and `staticfiles/` (default: .)
//! - `PORT` - Port to listen on (default: 8000)
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `SECRET_KEY` - Secret key, required in production
//! - `DEBUG` - Force debug mode on or off
//! - `DATABASE_URL` - Postgres connection string; selects the production profile
//! - `RENDER` - Platform detection flag; any non-empty value selects production
//! - `RENDER_EXTERNAL_HOSTNAME` - Public hostname assigned by the platform
//! - `ALLOWED_HOSTS` - Extra accepted hosts (comma-separated)
//! - `CSRF_TRUSTED_ORIGINS` - Extra trusted origins (comma-separated)
//! - `STATIC_URL` - Public prefix of static files (default: /static/)
//! - `STATIC_BACKEND` - `plain`, `compressed` or `manifest`
//!
//! The raw values collected here are turned into a [`Settings`](crate::settings::Settings)
//! by [`Settings::from_args`](crate::settings::Settings::from_args).

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};

// =============================================================================
// Default Values
// =============================================================================

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port, matching the development server.
pub const DEFAULT_PORT: u16 = 8000;

/// Default public prefix for static files.
pub const DEFAULT_STATIC_URL: &str = "/static/";

// =============================================================================
// CLI Arguments
// =============================================================================

/// École Biblique - informational website server.
#[derive(Parser, Debug, Clone)]
#[command(name = "ecole-biblique")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Consume the parsed CLI and return the selected command.
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the web server.
    Serve(ServeConfig),

    /// Copy static sources into the static root, hashing them for the manifest backend.
    #[command(name = "collectstatic")]
    CollectStatic(CollectStaticConfig),

    /// Print the resolved settings and validate them.
    Check(CheckConfig),
}

/// Options shared by every subcommand; they drive settings resolution.
#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Project directory containing `static/` and `staticfiles/`.
    #[arg(long, default_value = ".", env = "BASE_DIR")]
    pub base_dir: PathBuf,

    /// Port the site is reachable on (also used for local CSRF origins).
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PORT")]
    pub port: u16,

    /// Secret key. Required in production.
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Force debug mode on or off, overriding the profile default.
    ///
    /// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off` in any case.
    #[arg(long, env = "DEBUG", value_parser = BoolishValueParser::new())]
    pub debug: Option<bool>,

    /// Database connection string. Its presence selects the production profile.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Hosting platform flag. Any non-empty value selects the production profile.
    #[arg(long = "platform", env = "RENDER")]
    pub platform: Option<String>,

    /// Public hostname assigned by the hosting platform.
    #[arg(long, env = "RENDER_EXTERNAL_HOSTNAME")]
    pub external_hostname: Option<String>,

    /// Additional accepted hosts (comma-separated).
    #[arg(long, env = "ALLOWED_HOSTS", value_delimiter = ',')]
    pub allowed_hosts: Vec<String>,

    /// Additional trusted origins for unsafe requests (comma-separated).
    #[arg(long, env = "CSRF_TRUSTED_ORIGINS", value_delimiter = ',')]
    pub csrf_trusted_origins: Vec<String>,

    /// Public URL prefix for static files.
    #[arg(long, default_value = DEFAULT_STATIC_URL, env = "STATIC_URL")]
    pub static_url: String,

    /// Static storage backend override: plain, compressed or manifest.
    #[arg(long, env = "STATIC_BACKEND")]
    pub static_backend: Option<String>,
}

impl Default for SiteArgs {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            port: DEFAULT_PORT,
            secret_key: None,
            debug: None,
            database_url: None,
            platform: None,
            external_hostname: None,
            allowed_hosts: Vec::new(),
            csrf_trusted_origins: Vec::new(),
            static_url: DEFAULT_STATIC_URL.to_string(),
            static_backend: None,
        }
    }
}

/// Configuration for the `serve` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "HOST")]
    pub host: String,

    #[command(flatten)]
    pub site: SiteArgs,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.site.port)
    }
}

/// Configuration for the `collectstatic` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CollectStaticConfig {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Remove the static root before copying.
    #[arg(long, default_value_t = false)]
    pub clear: bool,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Configuration for the `check` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Also list the images found under this static prefix.
    #[arg(long)]
    pub gallery: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================
