//! Watch command: tail the client log and notify Home Assistant.

use std::time::Duration;

use anyhow::{Context, Result};
use poeha_core::{Dispatcher, LogTail};
use poeha_notify::Client;

use crate::Config;

/// How long queued notifications get to finish after the loop stops.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Runs the watch command until Ctrl-C or a fatal log read error.
pub fn run(config: &Config) -> Result<()> {
    config.validate().context("configuration incomplete")?;

    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    runtime.block_on(watch(config))
}

async fn watch(config: &Config) -> Result<()> {
    tracing::info!(player = %config.player_name, "starting");

    let mut tail = LogTail::open(&config.log_file)
        .await
        .context("cannot watch the client log")?
        .with_poll_interval(config.poll_interval());

    let client = Client::new(&config.address, config.token.clone())
        .context("failed to create Home Assistant client")?;
    let (notifier, worker) = poeha_notify::spawn(client, config.queue_capacity);
    let mut dispatcher = Dispatcher::new(config.player_name.clone(), notifier);

    tracing::info!(path = %tail.path().display(), "monitoring client log");

    let outcome = tokio::select! {
        result = dispatcher.run(&mut tail) => result.context("stopped reading the client log"),
        signal = tokio::signal::ctrl_c() => signal
            .context("failed to listen for Ctrl-C")
            .map(|()| tracing::info!("interrupted, shutting down")),
    };

    let stats = dispatcher.stats();
    drop(dispatcher);

    match tokio::time::timeout(SHUTDOWN_GRACE, worker).await {
        Ok(Ok(delivery)) => tracing::info!(
            lines = stats.lines,
            forwarded = stats.forwarded,
            dropped = stats.dropped,
            delivered = delivery.delivered,
            failed = delivery.failed,
            "stopped"
        ),
        Ok(Err(err)) => tracing::warn!(error = %err, "delivery worker ended abnormally"),
        Err(_) => tracing::warn!("gave up waiting for pending notifications"),
    }

    outcome
}
