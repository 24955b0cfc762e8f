//! POS Audit - audit log query service for the point-of-sale backend
//!
//! Serves the filtered, paginated audit log API used by the employee
//! dashboards.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use pos_audit::config::{LogFormat, LogTarget};
use pos_audit::{
    api, config, db, db::SqliteAuditLogStore, services::AuditLogService, AppConfig, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("POS Audit {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must outlive the server so buffered file logs are flushed
    let _log_guard = init_logging(&config);

    info!("POS Audit starting up");

    ensure_data_directory(&config)?;

    info!("Initializing database connection");
    let db = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;

    let store = SqliteAuditLogStore::new(db.clone())
        .with_default_page_size(config.audit.default_page_size);
    let state = AppState {
        config: config.clone(),
        db,
        audit_log: AuditLogService::new(Arc::new(store)),
    };

    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address configuration")?;

    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

/// Initialize the logging/tracing infrastructure
fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_config = &config.logging;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_config.level));

    let (file_writer, guard) = match log_config.target {
        LogTarget::Console => (None, None),
        LogTarget::File | LogTarget::Both => {
            let (writer, guard) = create_file_writer(log_config);
            (Some(writer), Some(guard))
        }
    };
    let console = log_config.target != LogTarget::File;

    // Optional layers are no-ops when None, so one registry covers all targets
    match log_config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(console.then(|| fmt::layer().json().with_target(true)))
            .with(
                file_writer.map(|w| fmt::layer().json().with_target(true).with_writer(w)),
            )
            .init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(console.then(|| fmt::layer().compact().with_target(false)))
            .with(file_writer.map(|w| {
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(w)
            }))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(console.then(|| {
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
            }))
            .with(file_writer.map(|w| {
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(w)
            }))
            .init(),
    }

    guard
}

/// Create a file writer with optional daily rotation
fn create_file_writer(
    log_config: &config::LoggingConfig,
) -> (
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let file_appender = if log_config.daily_rotation {
        tracing_appender::rolling::daily(&log_config.log_dir, &log_config.log_prefix)
    } else {
        tracing_appender::rolling::never(&log_config.log_dir, &log_config.log_prefix)
    };

    tracing_appender::non_blocking(file_appender)
}

/// Ensure the directory holding the SQLite file exists
fn ensure_data_directory(config: &AppConfig) -> Result<()> {
    if let Some(path) = sqlite_file_path(&config.database.url) {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).context("Failed to create data directory")?;
                info!("Created data directory: {:?}", parent);
            }
        }
    }
    Ok(())
}

/// File path part of a `sqlite://` URL, without query options
fn sqlite_file_path(url: &str) -> Option<&str> {
    let path = url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or(path);
    (!path.is_empty() && !path.starts_with(":memory:")).then_some(path)
}

/// Create the application router with all routes and middleware
fn create_router(state: AppState, config: &AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let router = Router::new().nest("/api", api::routes()).with_state(state);

    let router = match config.server.request_timeout_secs {
        Some(secs) => {
            info!("Request timeout set to {}s", secs);
            router.layer(TimeoutLayer::new(Duration::from_secs(secs)))
        }
        None => router,
    };

    router
        .layer(CompressionLayer::new())
        .layer(trace_layer)
        .layer(cors)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Print help message
fn print_help() {
    println!(
        r#"POS Audit {}

USAGE:
    pos-audit [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information

ENVIRONMENT:
    POS_AUDIT_CONFIG        Path to configuration file (default: config.yaml)
    POS_AUDIT_HOST          Listen address override
    POS_AUDIT_PORT          Listen port override
    POS_AUDIT_LOG_FORMAT    pretty, json or compact
    DATABASE_URL            SQLite database URL override
    RUST_LOG                Log filter override

CONFIGURATION:
    The application looks for configuration files in the following order:
    1. Path specified by POS_AUDIT_CONFIG environment variable
    2. ./config.yaml
    3. ./config/config.yaml
    4. /etc/pos-audit/config.yaml"#,
        env!("CARGO_PKG_VERSION")
    );
}
