//! Kubernetes Event Exporter
//!
//! Watches cluster events in a namespace and republishes them on an
//! in-process channel for downstream export. The default consumer writes one
//! structured line per event to the log.
//!
//! The output channel is deliberately tight (one slot by default): a slow
//! consumer throttles the watch session instead of growing a queue.

mod error;
mod export;
mod informer;
mod watcher;

#[cfg(test)]
mod test_utils;

use std::env;

use anyhow::{Context, Result};
use tracing::info;

use crate::error::ExporterError;
use crate::watcher::{DEFAULT_CHANNEL_CAPACITY, EventWatcher};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting Kubernetes Event Exporter");

    // Load configuration from environment variables
    let namespace = env::var("WATCH_NAMESPACE").ok();
    let capacity = match env::var("EVENT_CHANNEL_CAPACITY") {
        Ok(raw) => raw.parse::<usize>().map_err(|_| {
            ExporterError::InvalidConfig(format!(
                "EVENT_CHANNEL_CAPACITY must be a positive integer, got '{}'",
                raw
            ))
        })?,
        Err(_) => DEFAULT_CHANNEL_CAPACITY,
    };

    info!("Configuration:");
    info!(
        "  Namespace: {}",
        namespace.as_deref().unwrap_or("all namespaces")
    );
    info!("  Channel capacity: {}", capacity);

    let (watcher, events) =
        EventWatcher::with_channel_capacity(namespace.as_deref(), capacity).await?;
    let exporter = tokio::spawn(export::run(events));
    let handle = watcher.start();

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    // The export loop keeps draining while stop completes its handshake,
    // then ends on its own once the channel closes.
    handle.stop().await;
    let _ = exporter.await;

    Ok(())
}
