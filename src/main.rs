/*
 *  main.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use anyhow::{Context, Result};
use log::{LevelFilter, info, warn};
use tokio::sync::watch;

use inkbeat::config;
use inkbeat::display::create_driver;
use inkbeat::mpris::MprisSource;
use inkbeat::orchestrator::Orchestrator;

fn init_logging(level: Option<&str>) {
    let filter = match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    env_logger::Builder::from_default_env()
        .filter_level(filter)
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // ConfigError is the one fatal error class; everything past this point
    // degrades instead of aborting.
    let cfg = config::load().context("configuration")?;
    init_logging(cfg.log_level.as_deref());

    info!(
        "inkbeat v{} (built {})",
        env!("CARGO_PKG_VERSION"),
        inkbeat::BUILD_DATE
    );

    let display_config = cfg.display.unwrap_or_default();
    let driver = create_driver(&display_config).context("display setup")?;
    info!(
        "Display: {} ({}x{})",
        driver.name(),
        display_config.width,
        display_config.height
    );

    let source = Box::new(MprisSource::new());
    let mut orchestrator = Orchestrator::new(source, driver, display_config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    orchestrator.run(shutdown_rx).await;
    info!("Bye");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("SIGINT received"),
                _ = term.recv() => info!("SIGTERM received"),
            }
        }
        Err(e) => {
            warn!("SIGTERM handler unavailable ({e}); watching SIGINT only");
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Signal handler error: {e}");
            }
        }
    }
}
