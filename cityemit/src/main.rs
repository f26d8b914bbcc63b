//! cityemit - City emission tracker
//!
//! Produces a city emission every few seconds while foregrounded, stores it
//! in `<root>/cityemit.db` and renders the city-ordered list on every change.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cityemit::presentation::render::{render_details, render_emissions};
use cityemit::{AppContext, AppSettings};
use cityemit_common::config::{self, TomlConfig};
use cityemit_common::db;
use cityemit_common::events::CityEvent;
use futures::StreamExt;
use tokio::signal;
use tracing::{debug, info, warn};

/// Command-line arguments for cityemit
#[derive(Parser, Debug)]
#[command(name = "cityemit")]
#[command(about = "Synthetic city emission producer and viewer")]
#[command(version)]
struct Args {
    /// Folder holding cityemit.db
    #[arg(short, long, env = "CITYEMIT_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Keep everything in memory instead of on disk
    #[arg(long)]
    in_memory: bool,

    /// Delay between producer cycles (overrides config)
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    run_for_secs: Option<u64>,

    /// Exit once every city has been produced
    #[arg(long)]
    exit_when_done: bool,

    /// Show details and a welcome notice for this city before exiting
    #[arg(long)]
    details: Option<String>,

    /// Print the final list as JSON
    #[arg(long)]
    json: bool,

    /// Start in the background: subscribed, but producing nothing
    #[arg(long)]
    start_paused: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml = TomlConfig::load_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("cityemit={0},cityemit_common={0}", toml.logging.level).into()
            }),
        )
        .init();

    info!("Starting cityemit v{}", env!("CARGO_PKG_VERSION"));

    let pool = if args.in_memory {
        info!("Using in-memory database");
        db::init_memory_database()
            .await
            .context("Failed to open in-memory database")?
    } else {
        let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml);
        let db_path = config::database_path(&root_folder);
        info!("Database path: {}", db_path.display());
        db::init_database(&db_path)
            .await
            .with_context(|| format!("Failed to initialize database at {}", db_path.display()))?
    };

    let mut settings = AppSettings::from_toml(&toml);
    if let Some(ms) = args.interval_ms {
        settings.emission_interval = Duration::from_millis(ms);
    }
    info!("Emission interval: {:?}", settings.emission_interval);

    let app = AppContext::build(pool, settings)
        .await
        .context("Failed to wire application")?;

    let mut events = app.events.subscribe();
    let mut list_updates = app.view_model.emission_stream();

    let renderer = tokio::spawn(async move {
        while let Some(list) = list_updates.next().await {
            println!("{}\n", render_emissions(&list));
        }
    });

    if args.start_paused {
        info!("Starting paused; no emissions until resumed");
        app.start_backgrounded().await;
    } else {
        app.resume().await;
    }

    let deadline = async {
        match args.run_for_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = &mut deadline => {
                info!("Run time elapsed");
                break;
            }
            event = events.recv() => match event {
                Ok(CityEvent::EmissionRecorded { city, color, outcome, .. }) => {
                    info!("Recorded {} ({}) [{:?}]", city, color, outcome);
                }
                Ok(CityEvent::StorageFailure { city, message, .. }) => {
                    warn!("Emission for {} dropped: {}", city, message);
                }
                Ok(CityEvent::ProductionExhausted { .. }) => {
                    info!("All cities produced");
                    if args.exit_when_done {
                        break;
                    }
                }
                Ok(other) => debug!("Event: {}", other.event_type()),
                Err(e) => warn!("Event stream lagged: {}", e),
            },
        }
    }

    app.pause().await;

    if let Some(city) = args.details.as_deref() {
        match app.view_model.details(city) {
            Some(details) => println!("{}\n", render_details(&details)),
            None => println!("{} has not been produced yet\n", city),
        }
        if let Some(handle) = app.view_model.schedule_welcome(city) {
            handle.await.context("Welcome notice task failed")?;
        }
    }

    app.shutdown().await;
    renderer.abort();

    if args.json {
        let list = app.view_model.emissions();
        println!("{}", serde_json::to_string_pretty(&list)?);
    }

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
