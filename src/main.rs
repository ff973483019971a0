mod app;
mod cli;
mod config;
mod fetch;
mod picture;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.output.verbose { "potd=trace,info" } else { "potd=debug,info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(command) = cli.command {
        return cli::run(command, &cli.output).await;
    }

    tracing::info!("Starting potd");

    let config = Config::load().unwrap_or_else(|e| {
        tracing::error!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([720.0, 640.0])
        .with_min_inner_size([480.0, 400.0])
        .with_title("Picture of the Day");

    let native_options = eframe::NativeOptions {
        viewport,
        persist_window: true, // Save/restore window size and position
        ..Default::default()
    };

    eframe::run_native(
        "potd",
        native_options,
        Box::new(|cc| Ok(Box::new(app::PotdApp::new(cc, config)?))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run application: {}", e))?;

    Ok(())
}
