// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Domain layer: pure data types and validation helpers shared between UI and store logic.

pub mod payload;
pub mod stamp;
