#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod views;
mod worker;

use app::DashboardApp;
use sd_app::DashboardConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // optional first argument: dashboard config file
    let config = match std::env::args().nth(1) {
        Some(path) => sd_app::load_yaml(Path::new(&path)).unwrap_or_else(|err| {
            tracing::warn!(%path, error = %err, "using default configuration");
            DashboardConfig::default()
        }),
        None => DashboardConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("Seneca Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Seneca Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
}
