// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Display formatting helpers.

/// Human-readable formatting for byte sizes with binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Pluralized stamp count, e.g. `"1 stamp"` or `"3 stamps"`.
pub fn stamp_count(count: usize) -> String {
    if count == 1 {
        "1 stamp".to_string()
    } else {
        format!("{count} stamps")
    }
}

#[cfg(test)]
mod tests {
    use super::{format_bytes, stamp_count};

    #[test]
    fn formats_bytes_with_binary_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn pluralizes_stamp_count() {
        assert_eq!(stamp_count(0), "0 stamps");
        assert_eq!(stamp_count(1), "1 stamp");
        assert_eq!(stamp_count(12), "12 stamps");
    }
}
