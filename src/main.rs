// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! YOLABEL - YOLO bounding-box label editor
//!
//! A cross-platform desktop application for drawing and editing
//! axis-aligned bounding boxes over a folder of images, stored as
//! YOLO-format label files next to each image.

mod app;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::LabelerApp;
use io::config::CONFIG_FILE;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1300.0, 1000.0])
            .with_min_inner_size([900.0, 650.0])
            .with_title("YOLABEL - YOLO Label Editor"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "YOLABEL",
        options,
        Box::new(|cc| Ok(Box::new(LabelerApp::new(&cc.egui_ctx, PathBuf::from(CONFIG_FILE))))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
