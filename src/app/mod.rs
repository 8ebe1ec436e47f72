// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Application entry point wiring configuration, storage, and egui/eframe together.

use std::sync::Arc;

use eframe::egui;
use egui_phosphor::Variant;
use tracing::{info, warn};

use crate::config::Config;
use crate::logic::clipboard::SystemClipboard;
use crate::logic::storage::{FileStorage, MemoryStorage, StorageBackend};
use crate::logic::store::StampStore;
use crate::mvu::AppModel;
use crate::ui::ClipStampApp;

/// Bootstrap the desktop application and run the main egui event loop.
pub fn run() -> eframe::Result<()> {
    let config = Config::load();

    let mut store = StampStore::new(storage_backend(&config));
    store.load();

    // Register Phosphor icon font.
    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, Variant::Regular);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("ClipStamp")
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([420.0, 360.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let workers = config.worker_count();
    info!(workers, "Starting ClipStamp");

    eframe::run_native(
        "ClipStamp",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_fonts(fonts);
            let model = AppModel::new(store, &config);
            let clipboard = Arc::new(SystemClipboard::spawn());
            Ok(Box::new(ClipStampApp::new(
                &cc.egui_ctx,
                model,
                workers,
                clipboard,
            )))
        }),
    )
}

/// File storage in the data directory, or an in-memory fallback when none is known.
fn storage_backend(config: &Config) -> Box<dyn StorageBackend> {
    match config.data_dir() {
        Some(dir) => Box::new(FileStorage::new(dir)),
        None => {
            warn!("No data directory available; stamps will not be saved");
            Box::new(MemoryStorage::default())
        }
    }
}
