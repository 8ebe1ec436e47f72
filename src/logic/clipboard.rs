// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Clipboard access for copying stamps out and pasting images in.
//!
//! The platform clipboard only speaks raw RGBA, so writes decode the stored
//! image bytes first (rasterizing SVG) and reads re-encode to PNG. The
//! `arboard` handle lives on a dedicated thread for the whole process so the
//! copied image stays available after the request returns.

use std::borrow::Cow;
use std::io::Cursor;
use std::thread;

use crossbeam_channel::{Sender, bounded, unbounded};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::models::payload::{self, PayloadError};

const SVG_MIME: &str = "image/svg+xml";

/// Binary clipboard content tagged with its MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipboardItem {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Clipboard failures surfaced to the user as a notification.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("clipboard rejected the image: {0}")]
    Platform(String),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Platform clipboard seam; implementations must be callable from worker threads.
pub trait ClipboardBackend: Send + Sync {
    /// Store `item` so other applications paste it as a native image.
    fn write(&self, item: &ClipboardItem) -> Result<(), ClipboardError>;
    /// Read every image currently on the clipboard; empty when there is none.
    fn read_images(&self) -> Result<Vec<ClipboardItem>, ClipboardError>;
}

/// Decode a stored payload and write it to the clipboard under its own MIME type.
///
/// # Errors
///
/// Fails for malformed payloads, non-image types, and any backend failure.
pub fn copy_payload(backend: &dyn ClipboardBackend, encoded: &str) -> Result<(), ClipboardError> {
    let decoded = payload::decode(encoded)?;
    if !decoded.is_image() {
        return Err(ClipboardError::UnsupportedType(decoded.mime));
    }
    let item = ClipboardItem {
        mime: decoded.mime,
        bytes: decoded.bytes,
    };
    backend.write(&item)?;
    debug!(mime = %item.mime, size = item.bytes.len(), "Copied stamp to clipboard");
    Ok(())
}

enum Request {
    SetImage(
        arboard::ImageData<'static>,
        Sender<Result<(), ClipboardError>>,
    ),
    GetImage(Sender<Result<Option<arboard::ImageData<'static>>, ClipboardError>>),
}

/// System clipboard served by a long-lived `arboard` thread.
pub struct SystemClipboard {
    tx: Sender<Request>,
}

impl SystemClipboard {
    /// Start the clipboard thread. The platform handle is opened lazily on first use.
    pub fn spawn() -> Self {
        let (tx, rx) = unbounded::<Request>();
        let spawned = thread::Builder::new()
            .name("clipboard".into())
            .spawn(move || {
                let mut clipboard: Option<arboard::Clipboard> = None;
                for request in rx.iter() {
                    if clipboard.is_none() {
                        match arboard::Clipboard::new() {
                            Ok(handle) => clipboard = Some(handle),
                            Err(err) => warn!(error = %err, "Failed to open clipboard"),
                        }
                    }
                    serve(clipboard.as_mut(), request);
                }
            });
        if let Err(err) = spawned {
            error!(error = %err, "Failed to start clipboard thread");
        }
        Self { tx }
    }
}

fn serve(clipboard: Option<&mut arboard::Clipboard>, request: Request) {
    let unavailable = || ClipboardError::Unavailable("no clipboard handle".into());
    match request {
        Request::SetImage(image, reply) => {
            let result = match clipboard {
                Some(cb) => cb
                    .set_image(image)
                    .map_err(|e| ClipboardError::Platform(e.to_string())),
                None => Err(unavailable()),
            };
            let _ = reply.send(result);
        }
        Request::GetImage(reply) => {
            let result = match clipboard {
                Some(cb) => match cb.get_image() {
                    Ok(image) => Ok(Some(image)),
                    Err(arboard::Error::ContentNotAvailable) => Ok(None),
                    Err(e) => Err(ClipboardError::Platform(e.to_string())),
                },
                None => Err(unavailable()),
            };
            let _ = reply.send(result);
        }
    }
}

impl ClipboardBackend for SystemClipboard {
    fn write(&self, item: &ClipboardItem) -> Result<(), ClipboardError> {
        let image = rasterize(item)?;
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send(Request::SetImage(image, reply_tx))
            .map_err(|_| ClipboardError::Unavailable("clipboard thread stopped".into()))?;
        reply_rx
            .recv()
            .map_err(|_| ClipboardError::Unavailable("clipboard thread stopped".into()))?
    }

    fn read_images(&self) -> Result<Vec<ClipboardItem>, ClipboardError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send(Request::GetImage(reply_tx))
            .map_err(|_| ClipboardError::Unavailable("clipboard thread stopped".into()))?;
        let image = reply_rx
            .recv()
            .map_err(|_| ClipboardError::Unavailable("clipboard thread stopped".into()))??;

        match image {
            Some(image) => Ok(vec![ClipboardItem {
                mime: "image/png".into(),
                bytes: encode_png(&image)?,
            }]),
            None => Ok(Vec::new()),
        }
    }
}

/// Decode clipboard item bytes into straight-alpha RGBA pixels.
fn rasterize(item: &ClipboardItem) -> Result<arboard::ImageData<'static>, ClipboardError> {
    if item.mime == SVG_MIME {
        return rasterize_svg(&item.bytes);
    }

    let format = image::ImageFormat::from_mime_type(&item.mime)
        .ok_or_else(|| ClipboardError::UnsupportedType(item.mime.clone()))?;
    let rgba = image::load_from_memory_with_format(&item.bytes, format)
        .map_err(|e| ClipboardError::Decode(e.to_string()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(arboard::ImageData {
        width: width as usize,
        height: height as usize,
        bytes: Cow::Owned(rgba.into_raw()),
    })
}

fn rasterize_svg(bytes: &[u8]) -> Result<arboard::ImageData<'static>, ClipboardError> {
    use resvg::{tiny_skia, usvg};

    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|e| ClipboardError::Decode(e.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| ClipboardError::Decode("SVG has an empty canvas".into()))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha; the clipboard expects straight alpha.
    let pixels: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    Ok(arboard::ImageData {
        width: size.width() as usize,
        height: size.height() as usize,
        bytes: Cow::Owned(pixels),
    })
}

fn encode_png(image: &arboard::ImageData<'_>) -> Result<Vec<u8>, ClipboardError> {
    let buffer = image::RgbaImage::from_raw(
        image.width as u32,
        image.height as u32,
        image.bytes.to_vec(),
    )
    .ok_or_else(|| ClipboardError::Decode("clipboard image has an unexpected size".into()))?;

    let mut png = Vec::new();
    buffer
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| ClipboardError::Decode(e.to_string()))?;
    Ok(png)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use image::{ImageBuffer, Rgba};

    use super::*;

    /// Records writes and serves canned paste content.
    #[derive(Default)]
    pub(crate) struct RecordingClipboard {
        pub written: Mutex<Vec<ClipboardItem>>,
        pub paste: Mutex<Vec<ClipboardItem>>,
        pub fail_writes: bool,
    }

    impl ClipboardBackend for RecordingClipboard {
        fn write(&self, item: &ClipboardItem) -> Result<(), ClipboardError> {
            if self.fail_writes {
                return Err(ClipboardError::Platform("permission denied".into()));
            }
            self.written.lock().unwrap().push(item.clone());
            Ok(())
        }

        fn read_images(&self) -> Result<Vec<ClipboardItem>, ClipboardError> {
            Ok(self.paste.lock().unwrap().clone())
        }
    }

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgba([0, 128, 255, 255]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn copy_writes_binary_tagged_with_payload_mime() {
        let clipboard = RecordingClipboard::default();
        let png = png_bytes(2, 2);
        let encoded = payload::encode("image/png", &png);

        copy_payload(&clipboard, &encoded).unwrap();

        let written = clipboard.written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].mime, "image/png");
        assert_ne!(written[0].mime, "text/plain");
        assert_eq!(written[0].bytes, png);
    }

    #[test]
    fn copy_rejects_non_image_payloads() {
        let clipboard = RecordingClipboard::default();

        let err = copy_payload(&clipboard, "data:text/plain;base64,aGk=").unwrap_err();
        assert!(matches!(err, ClipboardError::UnsupportedType(ref m) if m == "text/plain"));

        let err = copy_payload(&clipboard, "not a payload").unwrap_err();
        assert!(matches!(err, ClipboardError::Payload(PayloadError::NotDataUri)));

        assert!(clipboard.written.lock().unwrap().is_empty());
    }

    #[test]
    fn copy_propagates_backend_failure() {
        let clipboard = RecordingClipboard {
            fail_writes: true,
            ..Default::default()
        };
        let encoded = payload::encode("image/png", &png_bytes(1, 1));

        let err = copy_payload(&clipboard, &encoded).unwrap_err();

        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn rasterize_decodes_png_to_rgba() {
        let item = ClipboardItem {
            mime: "image/png".into(),
            bytes: png_bytes(3, 2),
        };

        let image = rasterize(&item).unwrap();

        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.bytes.len(), 3 * 2 * 4);
        assert_eq!(&image.bytes[..4], &[0, 128, 255, 255]);
    }

    #[test]
    fn rasterize_renders_svg() {
        let svg = r"<svg xmlns='http://www.w3.org/2000/svg' width='4' height='4'><rect width='4' height='4' fill='red'/></svg>";
        let item = ClipboardItem {
            mime: SVG_MIME.into(),
            bytes: svg.as_bytes().to_vec(),
        };

        let image = rasterize(&item).unwrap();

        assert_eq!((image.width, image.height), (4, 4));
        assert_eq!(&image.bytes[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn rasterize_rejects_garbage_and_unknown_types() {
        let garbage = ClipboardItem {
            mime: "image/png".into(),
            bytes: b"not an image".to_vec(),
        };
        assert!(matches!(rasterize(&garbage), Err(ClipboardError::Decode(_))));

        let unknown = ClipboardItem {
            mime: "image/x-unknown".into(),
            bytes: vec![1, 2, 3],
        };
        assert!(matches!(
            rasterize(&unknown),
            Err(ClipboardError::UnsupportedType(_))
        ));
    }

    #[test]
    fn encode_png_round_trips_pixels() {
        let image = arboard::ImageData {
            width: 1,
            height: 1,
            bytes: Cow::Owned(vec![10, 20, 30, 255]),
        };

        let png = encode_png(&image).unwrap();
        let back = rasterize(&ClipboardItem {
            mime: "image/png".into(),
            bytes: png,
        })
        .unwrap();

        assert_eq!(back.bytes.as_ref(), &[10, 20, 30, 255]);
    }
}
