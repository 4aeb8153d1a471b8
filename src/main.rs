//! École Biblique - website server.
//!
//! This binary resolves the settings and then serves the site, collects the
//! static files, or prints a configuration report.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecole_biblique::{
    config::{CheckConfig, Cli, CollectStaticConfig, Command, ServeConfig, SiteArgs},
    create_storage,
    gallery::image_urls,
    server::{create_router, AppState, RouterConfig, ROUTES},
    settings::{Profile, Settings, StaticBackend},
    storage::collect_static,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::CollectStatic(config) => run_collect_static(config),
        Command::Check(config) => run_check(config),
    }
}

/// Resolve and validate settings, logging the reason on failure.
fn load_settings(args: &SiteArgs) -> Option<Settings> {
    let settings = match Settings::from_args(args) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Configuration error: {}", e);
            return None;
        }
    };
    if let Err(e) = settings.validate() {
        error!("Configuration error: {}", e);
        return None;
    }
    Some(settings)
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    let Some(settings) = load_settings(&config.site) else {
        return ExitCode::FAILURE;
    };

    info!("École Biblique v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Profile: {}", settings.profile);
    info!("  Database: {}", settings.database.describe());
    info!("  Allowed hosts: {}", settings.allowed_hosts.join(", "));
    info!(
        "  Static files: {} backend from {}",
        settings.static_files.backend,
        settings.static_location().display()
    );
    if settings.debug {
        warn!("  Debug: ENABLED - do not run production traffic with debug on");
    }
    if settings.profile == Profile::Local && config.site.secret_key.is_none() {
        warn!("  Secret key: using the development key");
    }

    let storage = match create_storage(&settings) {
        Ok(storage) => storage,
        Err(e) => {
            error!("Failed to open static storage: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let router_config = RouterConfig::default().with_tracing(!config.no_tracing);
    let router = create_router(AppState::new(settings, storage), router_config);
    let addr = config.bind_address();

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    for route in ROUTES {
        info!("    {:<12} {}", route.name, route.path);
    }
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "ecole_biblique=debug,tower_http=debug"
    } else {
        "ecole_biblique=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// =============================================================================
// Collectstatic Command
// =============================================================================

fn run_collect_static(config: CollectStaticConfig) -> ExitCode {
    init_logging(config.verbose);

    let settings = match Settings::from_args(&config.site) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let hashed = settings.static_files.backend == StaticBackend::Manifest;
    match collect_static(
        &settings.static_files.source_dirs,
        &settings.static_files.root,
        hashed,
        config.clear,
    ) {
        Ok(report) => {
            println!(
                "{} static file(s) copied to '{}'{}.",
                report.copied,
                settings.static_files.root.display(),
                if hashed {
                    format!(", {} post-processed", report.hashed)
                } else {
                    String::new()
                }
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("collectstatic failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Check Command
// =============================================================================

fn run_check(config: CheckConfig) -> ExitCode {
    println!("École Biblique Configuration Check");
    println!("══════════════════════════════════");
    println!();

    let settings = match Settings::from_args(&config.site) {
        Ok(settings) => settings,
        Err(e) => {
            println!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("  Profile:              {}", settings.profile);
    println!("  Debug:                {}", settings.debug);
    println!("  Database:             {}", settings.database.describe());
    println!("  Allowed hosts:        {}", settings.allowed_hosts.join(", "));
    println!(
        "  CSRF trusted origins: {}",
        settings.csrf_trusted_origins.join(", ")
    );
    println!("  SSL redirect:         {}", settings.security.ssl_redirect);
    println!(
        "  Secure cookies:       session={} csrf={}",
        settings.security.session_cookie_secure, settings.security.csrf_cookie_secure
    );
    println!(
        "  Static files:         {} ({}) at {}",
        settings.static_files.backend,
        settings.static_files.url,
        settings.static_location().display()
    );
    println!(
        "  Locale:               {} / {}",
        settings.language_code, settings.time_zone
    );
    println!();

    if let Err(e) = settings.validate() {
        println!("✗ {}", e);
        return ExitCode::FAILURE;
    }
    println!("✓ Settings are valid");

    let storage = match create_storage(&settings) {
        Ok(storage) => {
            println!("✓ Static storage opened");
            storage
        }
        Err(e) => {
            println!("✗ Static storage: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(prefix) = config.gallery {
        println!();
        println!("Images under '{}':", prefix);
        let urls = image_urls(storage.as_ref(), &prefix);
        if urls.is_empty() {
            println!("  (no images found)");
        } else {
            for url in &urls {
                println!("  {}", url);
            }
            println!();
            println!("Total: {} image(s)", urls.len());
        }
    }

    println!();
    println!("══════════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
