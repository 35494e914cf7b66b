//! # homeschedd
//!
//! The homesched daemon.
//!
//! Composition root that wires the storage adapter into the scheduler and
//! drives it once a minute.
//!
//! ## Responsibilities
//! - Load configuration (`homesched.toml`, env vars)
//! - Install the `tracing` subscriber
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct the scheduler, injecting repositories via port traits
//! - Tick the scheduler at every minute boundary until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod ticker;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use homesched_adapter_storage_sqlite_sqlx::{
    Config as StorageConfig, SqliteDeviceRepository, SqliteTaskRepository,
};
use homesched_app::scheduler::Scheduler;
use homesched_app::services::device_service::DeviceService;
use homesched_app::services::task_service::TaskService;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).context("parsing logging filter")?,
        )
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("opening database")?;
    let pool = db.pool().clone();

    // Services
    let device_service = DeviceService::new(SqliteDeviceRepository::new(pool.clone()));
    let task_service = TaskService::new(SqliteTaskRepository::new(pool.clone()));
    let scheduler = Scheduler::new(
        SqliteDeviceRepository::new(pool.clone()),
        SqliteTaskRepository::new(pool),
    );

    let devices = device_service.list_devices().await?;
    let tasks = task_service.list_tasks().await?;
    tracing::info!(
        database_url = config.database_url(),
        devices = devices.len(),
        tasks = tasks.len(),
        energy_usage = device_service.total_energy_usage().await?,
        "homeschedd started"
    );

    ticker::run(&scheduler, config.scheduler.tick_on_startup, shutdown_signal()).await;

    tracing::info!("homeschedd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
