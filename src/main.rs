//! PlantVillage Web Server
//!
//! Serves the plant disease recognition pages: upload a leaf photo, get the
//! predicted disease, the top 5 candidates and the disease details.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use plantvillage_web::backend::backend_name;
use plantvillage_web::inference::record_path;
use plantvillage_web::locale::Language;
use plantvillage_web::model::cnn::PlantClassifierConfig;
use plantvillage_web::server::{app, AppState, ServerConfig};
use plantvillage_web::utils::logging::{init_logging, LogConfig, LogLevel};
use plantvillage_web::DEFAULT_MODEL_PATH;

/// PlantVillage Disease Recognition Server
#[derive(Parser, Debug)]
#[command(name = "plantvillage-web")]
#[command(author = "Warre Snaet")]
#[command(version)]
#[command(about = "Web front-end for PlantVillage leaf disease recognition")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8501", env = "PLANTVILLAGE_PORT")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "PLANTVILLAGE_HOST")]
    host: String,

    /// Trained model record (.mpk)
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH, env = "PLANTVILLAGE_MODEL")]
    model: PathBuf,

    /// Directory served under /static
    #[arg(long, default_value = "static", env = "PLANTVILLAGE_STATIC_DIR")]
    static_dir: PathBuf,

    /// Maximum upload size in megabytes
    #[arg(long, default_value = "10", env = "PLANTVILLAGE_MAX_UPLOAD_MB")]
    max_upload_mb: usize,

    /// Language used when a request does not choose one (en, te, ta)
    #[arg(long, default_value = "en", env = "PLANTVILLAGE_DEFAULT_LANGUAGE")]
    default_language: Language,

    /// Load the model at start-up instead of on the first analysis
    #[arg(long, default_value = "false", env = "PLANTVILLAGE_PRELOAD")]
    preload: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "PLANTVILLAGE_LOG_LEVEL")]
    log_level: LogLevel,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default().with_level(cli.log_level)
    };
    init_logging(&log_config)?;

    // Build configuration
    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        model_path: cli.model,
        static_dir: cli.static_dir,
        max_upload_bytes: cli.max_upload_mb.saturating_mul(1024 * 1024),
        default_language: cli.default_language,
        preload_model: cli.preload,
    };
    config.validate()?;
    let addr = config.socket_addr()?;

    info!("PlantVillage Web v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Model:       {:?}", config.model_path);
    info!("  Static dir:  {:?}", config.static_dir);
    info!("  Max upload:  {} bytes", config.max_upload_bytes);
    info!("  Language:    {}", config.default_language);
    info!("  Backend:     {}", backend_name());

    let record = record_path(&config.model_path);
    if !record.is_file() {
        warn!(
            "Model not found at {:?}. Analysis requests will fail until it is in place.",
            record
        );
    }
    if !config.static_dir.is_dir() {
        warn!("Static directory {:?} does not exist", config.static_dir);
    }

    // Create shared state
    let state = Arc::new(AppState::new(config, PlantClassifierConfig::new())?);

    if state.config.preload_model {
        let preload = state.clone();
        // A missing or broken record is not fatal, the pages keep working
        tokio::task::spawn_blocking(move || preload.preload())
            .await
            .context("model preload task panicked")?;
    }

    // Start server
    let app = app(state);
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
