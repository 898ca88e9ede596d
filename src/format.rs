// ClipFetch - Media Retrieval Client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Display formatting for resolved metadata
//!
//! Pure conversions from the raw numbers the resolution endpoint returns
//! (seconds, view counts, byte sizes) into the strings the selection UI shows.
//! These are also exported to foreign UIs through uniffi.

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Format a duration as `m:ss`, or `h:mm:ss` when it reaches an hour
#[uniffi::export]
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Format a view count with a K/M/B suffix (e.g. "2.5M views")
#[uniffi::export]
pub fn format_view_count(count: u64) -> String {
    let n = count as f64;
    if count >= 1_000_000_000 {
        format!("{:.1}B views", n / 1_000_000_000.0)
    } else if count >= 1_000_000 {
        format!("{:.1}M views", n / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K views", n / 1_000.0)
    } else {
        format!("{} views", count)
    }
}

/// Format a byte size (e.g. "50.0 MB"); `None` when the size is unknown
#[uniffi::export]
pub fn format_file_size(bytes: Option<u64>) -> Option<String> {
    let bytes = bytes? as f64;
    let text = if bytes >= GIB {
        format!("{:.1} GB", bytes / GIB)
    } else if bytes >= MIB {
        format!("{:.1} MB", bytes / MIB)
    } else {
        format!("{:.1} KB", bytes / KIB)
    };
    Some(text)
}

/// Format a byte count for progress status lines, always in MB
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / MIB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(125), "2:05");
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3725), "1:02:05");
    }

    #[test]
    fn test_format_view_count() {
        assert_eq!(format_view_count(999), "999 views");
        assert_eq!(format_view_count(1_500), "1.5K views");
        assert_eq!(format_view_count(2_500_000), "2.5M views");
        assert_eq!(format_view_count(3_000_000_000), "3.0B views");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(Some(52_428_800)).as_deref(), Some("50.0 MB"));
        assert_eq!(format_file_size(Some(2 * 1024 * 1024 * 1024)).as_deref(), Some("2.0 GB"));
        assert_eq!(format_file_size(Some(512)).as_deref(), Some("0.5 KB"));
        assert_eq!(format_file_size(None), None);
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(0), "0.0 MB");
        assert_eq!(format_megabytes(1_572_864), "1.5 MB");
    }
}
