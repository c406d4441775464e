use auctioneer::adapters::{
    ArtifactRegistry, DryRunRegistry, HttpArtifactRegistry, JsonFileCatalog, PlayerCatalog,
    StaticCatalog,
};
use auctioneer::config::{AppConfig, LoggingConfig};
use auctioneer::domain::Player;
use auctioneer::error::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},auctioneer=debug", config.level))
    });

    // `tracing_appender::rolling::daily` panics if it can't create the initial
    // log file, so writability is checked first.
    let file_layer = config.dir.as_ref().and_then(|log_dir| {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!(
                "Warning: Could not create log directory {} ({}), file logging disabled",
                log_dir.display(),
                e
            );
            return None;
        }
        let test_path = log_dir.join(".auctioneer_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);

                let file_appender = tracing_appender::rolling::daily(log_dir, "auctioneer.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                // Keep the guard alive for the life of the process
                Box::leak(Box::new(guard));

                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not write to log directory {} ({}), file logging disabled",
                    log_dir.display(),
                    e
                );
                None
            }
        }
    });

    let (plain, json) = if config.json {
        (None, Some(tracing_subscriber::fmt::layer().json().with_target(true)))
    } else {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            ),
            None,
        )
    };

    let file_logging_enabled = file_layer.is_some();
    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .with(file_layer)
        .init();

    if file_logging_enabled {
        if let Some(dir) = &config.dir {
            eprintln!("Logging to: {}/auctioneer.log", dir.display());
        }
    }
}

pub fn init_logging_simple() {
    // Minimal logging for table-printing commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

/// Load config, fold in CLI overrides and reject invalid values up front
pub fn load_config(dir: &Path, players: Option<&Path>) -> Result<AppConfig> {
    let mut config = AppConfig::load_from(dir)?;
    if let Some(path) = players {
        config.catalog.path = Some(path.to_path_buf());
    }
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("config: {e}");
        }
        return Err(auctioneer::AuctionError::Validation(errors.join("; ")));
    }
    Ok(config)
}

pub async fn load_players(config: &AppConfig) -> Result<Vec<Player>> {
    let catalog: Box<dyn PlayerCatalog> = match &config.catalog.path {
        Some(path) => Box::new(JsonFileCatalog::new(path)),
        None => Box::new(StaticCatalog::demo()),
    };
    let players = catalog.load().await?;
    if players.is_empty() {
        return Err(auctioneer::AuctionError::EmptyCatalog);
    }
    info!(players = players.len(), "auction queue ready");
    Ok(players)
}

pub fn build_registry(config: &AppConfig) -> Result<Arc<dyn ArtifactRegistry>> {
    match (&config.registry.endpoint, config.registry.dry_run) {
        (Some(endpoint), false) => Ok(Arc::new(HttpArtifactRegistry::new(
            endpoint.clone(),
            config.registry.timeout_ms,
        )?)),
        _ => Ok(Arc::new(DryRunRegistry)),
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
