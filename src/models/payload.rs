// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Encoded stamp payloads: binary image data and its MIME type packed into a
//! single `data:` URI string.
//!
//! Payloads are always produced as `data:<mime>;base64,<data>`. Parsing also
//! tolerates the raw (non-base64) form so hand-edited or legacy entries still
//! load.

use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD as BASE64};
use base64::engine::DecodePaddingMode;
use base64::{Engine, alphabet};
use thiserror::Error;

/// MIME type assumed when a data URI omits one (RFC 2397).
const DEFAULT_MIME: &str = "text/plain";

/// Decoder accepting both padded and unpadded base64.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons a payload string cannot be turned back into bytes.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload is not a data URI")]
    NotDataUri,
    #[error("data URI is missing the ',' separator")]
    MissingSeparator,
    #[error("invalid base64 data: {0}")]
    InvalidBase64(String),
}

/// Binary content recovered from an encoded payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedPayload {
    /// Lowercased MIME essence, e.g. `image/png`.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DecodedPayload {
    /// Whether the payload declares an `image/*` type.
    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime)
    }
}

/// Encode raw bytes under the given MIME type as a base64 data URI.
///
/// # Examples
///
/// ```rust,ignore
/// let uri = encode("image/png", &[1, 2, 3]);
/// assert_eq!(uri, "data:image/png;base64,AQID");
/// ```
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime.trim(), BASE64.encode(bytes))
}

/// Parse a data URI back into its MIME type and bytes.
///
/// # Errors
///
/// Fails when the string is not a data URI, lacks the header/data separator,
/// or carries malformed base64.
pub fn decode(payload: &str) -> Result<DecodedPayload, PayloadError> {
    let (header, data) = split_data_uri(payload)?;

    let mut params = header.split(';');
    let mime = normalized_mime(params.next().unwrap_or_default());
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        LENIENT
            .decode(compact)
            .map_err(|e| PayloadError::InvalidBase64(e.to_string()))?
    } else {
        data.as_bytes().to_vec()
    };

    Ok(DecodedPayload { mime, bytes })
}

/// Read just the MIME type of a payload without decoding the data.
pub fn peek_mime(payload: &str) -> Option<String> {
    let (header, _) = split_data_uri(payload).ok()?;
    Some(normalized_mime(header.split(';').next().unwrap_or_default()))
}

/// Size of the decoded payload in bytes, computed without decoding.
pub fn approx_decoded_len(payload: &str) -> usize {
    match split_data_uri(payload) {
        Ok((header, data)) if header.to_ascii_lowercase().contains(";base64") => {
            let padding = data.bytes().rev().take_while(|b| *b == b'=').count();
            (data.len() * 3 / 4).saturating_sub(padding)
        }
        Ok((_, data)) => data.len(),
        Err(_) => 0,
    }
}

/// Return true when a declared MIME type names an image.
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

fn split_data_uri(payload: &str) -> Result<(&str, &str), PayloadError> {
    let trimmed = payload.trim_start();
    let rest = trimmed
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .map(|_| &trimmed[5..])
        .ok_or(PayloadError::NotDataUri)?;
    rest.split_once(',').ok_or(PayloadError::MissingSeparator)
}

fn normalized_mime(raw: &str) -> String {
    let mime = raw.trim().to_ascii_lowercase();
    if mime.is_empty() {
        DEFAULT_MIME.to_string()
    } else {
        mime
    }
}
