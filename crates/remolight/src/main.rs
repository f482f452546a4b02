use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use remolight::accessory::build_accessories;
use remolight::config::LoggingConfig;
use remolight::Config;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// Expose Nature Remo infrared lights as dimmable bridge accessories
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "remolight.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    init_tracing(&config.logging);

    tracing::info!("remolight starting");
    tracing::info!("Loaded config from: {}", args.config.display());

    let accessories = build_accessories(&config);
    if accessories.is_empty() {
        tracing::warn!("No accessories configured");
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let mut server = tokio::spawn(async move {
        remolight::api::serve(&config.api.listen, config.api.port, accessories, shutdown_rx).await
    });

    tracing::info!("Press Ctrl+C to exit");

    let finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => tracing::info!("Received shutdown signal"),
                Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
            }
            shutdown_tx.send(()).ok();
            None
        }
        // The server only returns on its own if it failed to start
        result = &mut server => Some(result),
    };

    let result = match finished {
        Some(result) => result,
        None => server.await,
    };
    result.context("HTTP API server task panicked")??;

    tracing::info!("remolight shutdown complete");

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = Targets::new()
        .with_default(LevelFilter::from(logging.level))
        .with_targets(
            logging
                .overrides
                .iter()
                .map(|(target, level)| (target.clone(), LevelFilter::from(*level))),
        );

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}
