// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Upload ingestion: normalize picked, dropped, and pasted files into encoded payloads.
//!
//! All three sources funnel into [`IncomingFile`]. Only files declaring an
//! `image/*` type are kept; each kept file is encoded independently so one
//! unreadable file never blocks its siblings.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::models::payload::{self, is_image_mime};

/// Extensions offered by the file picker's image filter.
pub const PICKER_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "ico", "tif", "tiff",
];

/// Where a batch of files came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestSource {
    Picker,
    Drop,
    Paste,
}

impl fmt::Display for IngestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IngestSource::Picker => "picker",
            IngestSource::Drop => "drop",
            IngestSource::Paste => "paste",
        };
        f.write_str(label)
    }
}

/// File content, either still on disk or already in memory.
#[derive(Clone, Debug)]
pub enum FileContent {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// A candidate file awaiting encoding.
#[derive(Clone, Debug)]
pub struct IncomingFile {
    /// Display name used in logs and messages.
    pub name: String,
    /// MIME type declared by the source (or guessed from the name).
    pub declared_mime: String,
    pub content: FileContent,
}

impl IncomingFile {
    /// Build from a filesystem path, guessing the MIME type from its extension.
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            declared_mime: guess_mime(&path),
            content: FileContent::Path(path),
        }
    }

    /// Build from in-memory bytes with an explicit MIME type.
    pub fn from_bytes(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_mime: mime.into(),
            content: FileContent::Bytes(bytes.into()),
        }
    }

    /// Convert an egui drop event entry. Entries with neither a path nor bytes are ignored.
    ///
    /// Dropped paths are typed by extension like picked ones; only in-memory
    /// drops use the MIME type reported by the platform.
    pub fn from_dropped(file: &egui::DroppedFile) -> Option<Self> {
        if let Some(path) = &file.path {
            return Some(Self::from_path(path.clone()));
        }

        let bytes = file.bytes.clone()?;
        let declared_mime = if file.mime.is_empty() {
            guess_mime(Path::new(&file.name))
        } else {
            file.mime.clone()
        };
        Some(Self {
            name: file.name.clone(),
            declared_mime,
            content: FileContent::Bytes(bytes),
        })
    }

    /// Whether the declared type is an image.
    pub fn is_image(&self) -> bool {
        is_image_mime(&self.declared_mime)
    }
}

/// Keep only image files, logging what gets skipped.
pub fn select_images(source: IngestSource, files: Vec<IncomingFile>) -> Vec<IncomingFile> {
    files
        .into_iter()
        .filter(|file| {
            let keep = file.is_image();
            if !keep {
                debug!(
                    %source,
                    name = %file.name,
                    mime = %file.declared_mime,
                    "Skipping non-image file"
                );
            }
            keep
        })
        .collect()
}

/// Read a file's content and encode it as a self-contained payload.
///
/// # Errors
///
/// Fails when the file cannot be read or is empty.
pub fn encode_file(file: &IncomingFile) -> Result<String> {
    let bytes = match &file.content {
        FileContent::Path(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read image file: {:?}", path))?,
        FileContent::Bytes(bytes) => bytes.to_vec(),
    };
    if bytes.is_empty() {
        bail!("{} is empty", file.name);
    }
    Ok(payload::encode(&file.declared_mime, &bytes))
}

/// Guess a MIME type from a path's extension.
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(guess_mime(Path::new("stamp.PNG")), "image/png");
        assert_eq!(guess_mime(Path::new("icon.svg")), "image/svg+xml");
        assert_eq!(guess_mime(Path::new("notes.txt")), "text/plain");
        assert_eq!(guess_mime(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn select_images_skips_non_images() {
        let files = vec![
            IncomingFile::from_path(PathBuf::from("cat.png")),
            IncomingFile::from_path(PathBuf::from("readme.md")),
            IncomingFile::from_bytes("pasted", "image/png", vec![1]),
            IncomingFile::from_bytes("pasted", "text/html", vec![1]),
        ];

        let kept = select_images(IngestSource::Drop, files);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].name, "cat.png");
        assert_eq!(kept[1].declared_mime, "image/png");
    }

    #[test]
    fn dropped_paths_are_typed_by_extension() {
        let with_path = egui::DroppedFile {
            path: Some(PathBuf::from("/tmp/photo.jpg")),
            mime: "application/octet-stream".into(),
            ..Default::default()
        };
        let incoming = IncomingFile::from_dropped(&with_path).unwrap();
        assert_eq!(incoming.name, "photo.jpg");
        assert_eq!(incoming.declared_mime, "image/jpeg");
        assert!(matches!(incoming.content, FileContent::Path(_)));

        let mislabelled = egui::DroppedFile {
            path: Some(PathBuf::from("/tmp/notes.txt")),
            mime: "image/png".into(),
            ..Default::default()
        };
        assert!(!IncomingFile::from_dropped(&mislabelled).unwrap().is_image());
    }

    #[test]
    fn in_memory_drops_use_reported_mime() {
        let in_memory = egui::DroppedFile {
            name: "web.gif".into(),
            mime: "image/gif".into(),
            bytes: Some(Arc::from(vec![1u8, 2, 3])),
            ..Default::default()
        };
        let incoming = IncomingFile::from_dropped(&in_memory).unwrap();
        assert_eq!(incoming.declared_mime, "image/gif");
        assert!(matches!(incoming.content, FileContent::Bytes(_)));

        let unnamed_type = egui::DroppedFile {
            name: "guess.webp".into(),
            bytes: Some(Arc::from(vec![1u8])),
            ..Default::default()
        };
        assert_eq!(
            IncomingFile::from_dropped(&unnamed_type).unwrap().declared_mime,
            "image/webp"
        );

        assert!(IncomingFile::from_dropped(&egui::DroppedFile::default()).is_none());
    }

    #[test]
    fn encode_file_reads_path_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dot.png");
        fs::write(&path, [1u8, 2, 3]).unwrap();

        let encoded = encode_file(&IncomingFile::from_path(path)).unwrap();

        assert_eq!(encoded, "data:image/png;base64,AQID");
    }

    #[test]
    fn encode_file_reports_failures_per_file() {
        let tmp = TempDir::new().unwrap();
        let missing = IncomingFile::from_path(tmp.path().join("missing.png"));
        let empty = IncomingFile::from_bytes("empty.png", "image/png", Vec::new());
        let fine = IncomingFile::from_bytes("fine.png", "image/png", vec![0xff]);

        assert!(encode_file(&missing).is_err());
        assert!(encode_file(&empty).is_err());
        assert!(encode_file(&fine).is_ok());
    }
}
