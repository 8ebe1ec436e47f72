// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Reusable egui components structured for MVU-style updates.

pub mod confirm_modal;
pub mod grid;
pub mod toast;
pub mod upload_area;
