#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use eframe::egui;
use sparql_viewer::{SparqlViewer, ViewerConfig};

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let config = ViewerConfig::from_env();
    log::info!("Default data URL: {}", config.default_data_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title("SPARQL Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "SPARQL Viewer",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(SparqlViewer::new(config)))
        }),
    )
}
