// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Business logic: stamp persistence, upload ingestion, and clipboard access.

pub mod clipboard;
pub mod ingest;
pub mod storage;
pub mod store;
