#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::egui;

mod components;
mod error;
mod process;
mod structs;
mod types;
mod ui;
mod util;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 520.0])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    log::info!("Starting image resizer v{}", env!("CARGO_PKG_VERSION"));

    eframe::run_native(
        "Image resizer",
        options,
        Box::new(|_cc| Ok(Box::<ui::App>::default())),
    )
}
