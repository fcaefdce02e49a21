mod api;
mod app;
mod cli;
mod config;
mod dispatcher;
mod error;
mod guard;
mod model;
mod poller;
mod projection;
mod settings_form;
mod state;
mod task;
mod ticker;
mod ui;
mod view_state;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands keep stdout clean, so only warnings reach stderr by default
    let default_filter = if cli.command.is_some() {
        "warn"
    } else {
        "dropdeck=debug,info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.command.is_some() {
        if let Err(e) = cli::run(cli).await {
            cli::print_error(&format!("{:#}", e));
            std::process::exit(1);
        }
        return Ok(());
    }

    tracing::info!("Starting Dropdeck dashboard");

    let mut config = Config::load()?;
    if let Some(url) = cli.url {
        config.server.base_url = url;
    }

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([960.0, 720.0])
        .with_min_inner_size([640.0, 480.0])
        .with_title("Dropdeck");

    let native_options = eframe::NativeOptions {
        viewport,
        persist_window: true,
        ..Default::default()
    };

    let view = cli.view;
    eframe::run_native(
        "Dropdeck",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::DropdeckApp::new(cc, config, view)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run dashboard: {}", e))?;

    Ok(())
}
