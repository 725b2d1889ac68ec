// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod config;
mod drivers;
mod engine;
mod gui;
mod types;
mod visualizer;
use config::{ConfigFile, CONFIG_FILE};
use eframe::egui;
// 入口函数
fn main() -> eframe::Result<()> {
    env_logger::init();
    let config = ConfigFile::open(CONFIG_FILE);
    log::info!("using config {}", config.path().display());
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([
            config.config.window_width as f32,
            config.config.window_height as f32,
        ])
        .with_min_inner_size([400.0, 300.0])
        .with_title("CurveBug I-V Tracer");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "CurveBug",
        options,
        Box::new(|_cc| Box::new(gui::CurveTracerApp::new(config))),
    )
}
