mod analysis;
mod app;
mod color;
mod config;
mod data;
mod pipeline;
mod state;
mod ui;

use std::path::PathBuf;

use app::OrderScopeApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional first argument: dataset path, overriding the config file.
    let config = DashboardConfig::resolve(std::env::args_os().nth(1).map(PathBuf::from))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "E-Commerce Analytics Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(OrderScopeApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard: {e}"))
}
