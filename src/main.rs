#![deny(missing_docs)]

//! Entry point for the egui-based Gradecast UI.
use std::path::PathBuf;

use eframe::egui;
use gradecast::egui_app::ui::{GradecastApp, MIN_VIEWPORT_SIZE};
use gradecast::logging;
use gradecast::model::PredictionService;
use tracing::error;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let startup = start_service();

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([960.0, 760.0])
        .with_min_inner_size(MIN_VIEWPORT_SIZE);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Gradecast",
        native_options,
        Box::new(move |_cc| match startup {
            Ok(service) => Ok(Box::new(GradecastApp::new(service))),
            Err(message) => Ok(Box::new(LaunchError { message })),
        }),
    )?;
    Ok(())
}

/// Load settings and the dataset and train both models before any form is shown.
fn start_service() -> Result<PredictionService, String> {
    let dataset = std::env::args_os().nth(1).map(PathBuf::from);
    PredictionService::from_settings(dataset).map_err(|err| {
        error!("Startup failed: {err}");
        format!("Could not prepare models: {err}")
    })
}

/// Minimal fallback app to display initialization errors.
struct LaunchError {
    message: String,
}

impl eframe::App for LaunchError {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Failed to start");
                ui.label(&self.message);
            });
        });
    }
}
