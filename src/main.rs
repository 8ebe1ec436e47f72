// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

mod app;
mod config;
mod logging;
mod logic;
mod models;
mod mvu;
mod ui;
mod utils;

fn main() -> eframe::Result<()> {
    logging::init();
    app::run()
}
