// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Shared helper utilities reused by UI and business logic.

pub mod format;

/// Human-readable byte sizes.
pub use format::format_bytes;
/// Pluralized stamp count label.
pub use format::stamp_count;
