//! padslots - keeps hot-plugged controllers on stable player slots

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use padslots::config::{AppConfig, AutoAssignConfig, ConfigWatcher, LoggingConfig};
use padslots::defaults::SwitchDefaults;
use padslots::paths::AppPaths;
use padslots::reconciler::{PersistenceActor, ReconcileActor, ReconcileActorHandle, SharedSlots};
use padslots::registry::{self, GilrsRegistry};

/// Keep hot-plugged controllers on stable player slots
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults to the detected app directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Drive the slots from an interactive prompt instead of real hardware
    #[arg(long)]
    simulate: bool,

    /// List connected gamepads and exit
    #[arg(long)]
    list_devices: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if args.list_devices {
        return list_devices().await;
    }

    let paths = AppPaths::detect();
    paths.ensure_directories()?;

    let config_path = args.config.clone().unwrap_or_else(|| paths.config.clone());
    let config_path = config_path.to_string_lossy().to_string();
    if !std::path::Path::new(&config_path).exists() {
        eprintln!("[config] Writing default configuration to {}", config_path);
        AppConfig::default().save(&config_path).await?;
    }

    let config = AppConfig::load(&config_path).await?;
    let _log_guard = init_logging(&args.log_level, &config.logging, &paths)?;

    info!("Starting padslots v{}...", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", config_path);
    info!("State directory: {}", paths.state_dir.display());

    let (config_watcher, _) = ConfigWatcher::new(config_path.clone()).await?;

    let sled_path = paths.sled_db_path();
    let persistence =
        PersistenceActor::spawn(&sled_path.to_string_lossy(), config.persistence.debounce_ms)?;

    let saved = match persistence.load_snapshot().await {
        Ok(Some(snapshot)) => {
            info!("Restored {} saved slot(s)", snapshot.bindings.len());
            snapshot.bindings
        }
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("Could not load saved slots, starting empty: {:#}", e);
            Vec::new()
        }
    };

    let shared_slots = SharedSlots::new();
    let reconciler = ReconcileActor::spawn(
        config.auto_assign.clone(),
        saved,
        Arc::new(SwitchDefaults),
        Arc::new(shared_slots.clone()),
        Arc::new(persistence.clone()),
    );

    let result = if args.simulate {
        run_simulated(reconciler.clone(), config_watcher).await
    } else {
        run_hardware(reconciler.clone(), config_watcher).await
    };

    info!("Shutting down...");
    // Queries queue behind notifications, so every save has been handed over after this
    let _ = reconciler.slots().await;
    reconciler.shutdown();
    if let Err(e) = persistence.flush().await {
        warn!("Final slot flush failed: {:#}", e);
    }
    persistence.shutdown();

    info!(
        "padslots shutdown complete ({} slot(s) assigned)",
        shared_slots.snapshot().len()
    );
    result
}

/// Real hardware: gilrs registry until Ctrl+C
async fn run_hardware(reconciler: ReconcileActorHandle, mut config_watcher: ConfigWatcher) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let mut gilrs_registry = GilrsRegistry::start(event_tx)?;
    tokio::spawn(registry::forward_events(event_rx, reconciler.clone()));

    info!("Watching for controllers (Ctrl+C to quit)");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(settings) = config_watcher.next_settings() => {
                apply_settings(&reconciler, settings);
            }
            _ = &mut shutdown => break,
        }
    }

    gilrs_registry.stop();
    Ok(())
}

/// Interactive REPL standing in for the registry
async fn run_simulated(reconciler: ReconcileActorHandle, mut config_watcher: ConfigWatcher) -> Result<()> {
    let runtime = tokio::runtime::Handle::current();
    let repl_handle = reconciler.clone();
    let mut repl = tokio::task::spawn_blocking(move || padslots::cli::run_repl(repl_handle, runtime));

    loop {
        tokio::select! {
            Some(settings) = config_watcher.next_settings() => {
                apply_settings(&reconciler, settings);
            }
            joined = &mut repl => {
                return joined.context("REPL task panicked")?;
            }
        }
    }
}

fn apply_settings(reconciler: &ReconcileActorHandle, settings: AutoAssignConfig) {
    info!(
        enabled = settings.enabled,
        max_slots = settings.max_slots,
        "Applying reloaded auto-assign settings"
    );
    reconciler.update_settings(settings);
}

async fn list_devices() -> Result<()> {
    let devices = tokio::task::spawn_blocking(registry::list_devices)
        .await
        .context("Device scan panicked")??;

    println!("\n{}", "Connected gamepads:".bold().cyan());
    if devices.is_empty() {
        println!("  {}", "(none found)".dimmed());
    }
    for device in devices {
        println!("  {}  {}", device.device_id.yellow(), device.display_name);
    }
    Ok(())
}

/// Console layer plus an optional daily-rolling file layer
///
/// The returned guard must stay alive for the file writer to flush.
fn init_logging(level: &str, logging: &LoggingConfig, paths: &AppPaths) -> Result<Option<WorkerGuard>> {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_filter(console_filter);

    let (file_layer, guard) = if logging.file {
        let appender = tracing_appender::rolling::daily(&paths.logs_dir, "padslots.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(EnvFilter::new("debug"));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
