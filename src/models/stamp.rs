// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Stamp domain model (UI-agnostic).

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;
use uuid::Uuid;

/// A user-saved image available for one-click clipboard copy.
///
/// Serialized as `{"id": ..., "data": ..., "createdAt": ...}` so the stored
/// collection stays a plain JSON array of objects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampImage {
    /// Opaque unique identifier, stable for the stamp's lifetime.
    pub id: String,
    /// Encoded payload (`data:` URI including the MIME type).
    pub data: String,
    /// Creation time in Unix epoch milliseconds.
    pub created_at: i64,
}

impl StampImage {
    /// Create a stamp with a fresh UUID and the current timestamp.
    pub fn new(data: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            data,
            created_at: now_millis(),
        }
    }

    /// Human-readable UTC creation time, or `None` for out-of-range timestamps.
    pub fn created_label(&self) -> Option<String> {
        let nanos = i128::from(self.created_at) * 1_000_000;
        let at = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
        at.format(format_description!(
            "[year]-[month]-[day] [hour]:[minute] UTC"
        ))
        .ok()
    }
}

fn now_millis() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::StampImage;

    #[test]
    fn new_stamps_get_unique_ids_and_timestamps() {
        let a = StampImage::new("data:image/png;base64,AAA".into());
        let b = StampImage::new("data:image/png;base64,AAA".into());

        assert_ne!(a.id, b.id);
        assert!(a.created_at > 0);
        assert!(b.created_at >= a.created_at);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let stamp = StampImage {
            id: "abc".into(),
            data: "data:image/png;base64,AAA".into(),
            created_at: 1_700_000_000_000,
        };

        let json = serde_json::to_string(&stamp).unwrap();
        assert_eq!(
            json,
            r#"{"id":"abc","data":"data:image/png;base64,AAA","createdAt":1700000000000}"#
        );

        let back: StampImage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stamp);
    }

    #[test]
    fn created_label_formats_utc() {
        let stamp = StampImage {
            id: "abc".into(),
            data: String::new(),
            created_at: 1_700_000_000_000,
        };
        assert_eq!(
            stamp.created_label().as_deref(),
            Some("2023-11-14 22:13 UTC")
        );
    }
}
