mod app;
mod config;
mod data;
mod error;
mod events;
mod session;
mod state;
mod ui;
mod view;

use app::CytoViewApp;
use config::ViewerConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ViewerConfig::load().unwrap_or_else(|e| {
        log::error!("{e}; falling back to defaults");
        ViewerConfig::default()
    });
    log::info!(
        "Import directory {}, {} bins per histogram",
        config.import_dir.display(),
        config.bin_count
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "cytoview – Cytometry Measurements",
        options,
        Box::new(move |_cc| Ok(Box::new(CytoViewApp::new(&config)))),
    )
}
