//! India Education Dashboard
//!
//! Loads statewise education statistics by income class and shows per-state
//! metrics, progression trends, a literacy choropleth and the issues faced.

mod charts;
mod config;
mod data;
mod geo;
mod gui;
mod stats;

use anyhow::Context;
use clap::Parser;
use config::DashboardArgs;
use eframe::egui;
use gui::DashboardApp;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = DashboardArgs::parse();
    log::info!(
        "starting dashboard (data: {}, boundaries: {})",
        args.data.display(),
        args.geojson.display()
    );

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 860.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("India Education Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "India Education Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, args)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("failed to start the dashboard window")
}
