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


//! Download progress computation
//!
//! # Known length
//! With a declared `Content-Length` of `L` the percentage is
//! `min(100, round(received / L * 100))`. While fewer than `L` bytes have
//! arrived the value is held at 99 at most, so 100 means every declared byte
//! is in.
//!
//! # Unknown length
//! Without a usable length the bar is drawn half-filled and the number shown
//! is a pseudo-percentage: one point per [`UNKNOWN_LENGTH_STEP`] bytes,
//! capped at [`UNKNOWN_LENGTH_CAP`]. It only tells the user bytes are moving.

use crate::format::format_megabytes;
use serde::{Deserialize, Serialize};

/// Bytes per pseudo-percent point when the total is unknown
pub const UNKNOWN_LENGTH_STEP: u64 = 512 * 1024;

/// Highest pseudo-percentage shown before end-of-stream
pub const UNKNOWN_LENGTH_CAP: u8 = 95;

/// Bar fill used for indeterminate progress
pub const INDETERMINATE_FILL: u8 = 50;

/// Whether a percentage is exact or only a hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressMode {
    /// Computed from a declared total
    Exact,
    /// No declared total; the number is feedback only
    Indeterminate,
}

/// Progress snapshot for a single download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Bytes received so far
    pub bytes_received: u64,

    /// Declared total, if any
    pub total_bytes: Option<u64>,

    /// Percentage shown to the user (0 - 100)
    pub percent: u8,

    /// How far the bar is filled (0 - 100)
    pub fill_percent: u8,

    /// Exact or indeterminate
    pub mode: ProgressMode,
}

impl ProgressReport {
    /// Report for a finished stream
    pub fn complete(bytes_received: u64, total_bytes: Option<u64>) -> Self {
        Self {
            bytes_received,
            total_bytes,
            percent: 100,
            fill_percent: 100,
            mode: ProgressMode::Exact,
        }
    }

    /// Status line for the progress surface
    pub fn status_text(&self) -> String {
        match self.mode {
            ProgressMode::Exact => match self.total_bytes {
                Some(total) => format!(
                    "Downloading... {}% ({} / {})",
                    self.percent,
                    format_megabytes(self.bytes_received),
                    format_megabytes(total)
                ),
                None => format!("Downloading... {}%", self.percent),
            },
            ProgressMode::Indeterminate => {
                format!("Downloading... {} received", format_megabytes(self.bytes_received))
            }
        }
    }
}

/// Tracks bytes received and turns them into reports
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_bytes: Option<u64>,
    bytes_received: u64,
    last_percent: u8,
}

impl ProgressTracker {
    /// Create a tracker; a declared length of zero counts as unknown
    pub fn new(total_bytes: Option<u64>) -> Self {
        Self {
            total_bytes: total_bytes.filter(|t| *t > 0),
            bytes_received: 0,
            last_percent: 0,
        }
    }

    /// Declared total after normalization
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    /// Bytes received so far
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Account for one chunk and report
    pub fn record(&mut self, chunk_len: usize) -> ProgressReport {
        self.bytes_received = self.bytes_received.saturating_add(chunk_len as u64);
        self.current()
    }

    /// Report for the bytes seen so far, without changing anything
    pub fn current(&mut self) -> ProgressReport {
        let (percent, fill_percent, mode) = match self.total_bytes {
            Some(total) => {
                let percent = exact_percent(self.bytes_received, total).max(self.last_percent);
                (percent, percent, ProgressMode::Exact)
            }
            None => {
                let percent = pseudo_percent(self.bytes_received).max(self.last_percent);
                (percent, INDETERMINATE_FILL, ProgressMode::Indeterminate)
            }
        };
        self.last_percent = percent;

        ProgressReport {
            bytes_received: self.bytes_received,
            total_bytes: self.total_bytes,
            percent,
            fill_percent,
            mode,
        }
    }

    /// Report for end-of-stream
    pub fn finish(&mut self) -> ProgressReport {
        self.last_percent = 100;
        ProgressReport::complete(self.bytes_received, self.total_bytes)
    }
}

fn exact_percent(received: u64, total: u64) -> u8 {
    if received >= total {
        return 100;
    }
    let rounded = (received as f64 / total as f64 * 100.0).round() as u8;
    rounded.min(99)
}

fn pseudo_percent(received: u64) -> u8 {
    (received / UNKNOWN_LENGTH_STEP).min(UNKNOWN_LENGTH_CAP as u64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_length_two_chunks() {
        let mut tracker = ProgressTracker::new(Some(1000));

        let first = tracker.record(400);
        assert_eq!(first.percent, 40);
        assert_eq!(first.mode, ProgressMode::Exact);
        assert_eq!(first.fill_percent, 40);

        let second = tracker.record(600);
        assert_eq!(second.percent, 100);
        assert_eq!(second.bytes_received, 1000);
    }

    #[test]
    fn test_known_length_never_rounds_up_to_100_early() {
        let mut tracker = ProgressTracker::new(Some(1000));
        assert_eq!(tracker.record(999).percent, 99);
        assert_eq!(tracker.record(1).percent, 100);
    }

    #[test]
    fn test_known_length_clamps_overflow() {
        let mut tracker = ProgressTracker::new(Some(100));
        assert_eq!(tracker.record(250).percent, 100);
    }

    #[test]
    fn test_known_length_monotonic_and_bounded() {
        let mut tracker = ProgressTracker::new(Some(10_007));
        let mut last = 0;
        for _ in 0..200 {
            let report = tracker.record(37);
            assert!(report.percent >= last);
            assert!(report.percent <= 99);
            last = report.percent;
        }
    }

    #[test]
    fn test_unknown_length_is_indeterminate_and_capped() {
        let mut tracker = ProgressTracker::new(None);

        let first = tracker.record(2048);
        let second = tracker.record(2048);
        for report in [&first, &second] {
            assert_eq!(report.mode, ProgressMode::Indeterminate);
            assert_eq!(report.fill_percent, INDETERMINATE_FILL);
            assert!(report.percent < 100);
        }
        assert_eq!(second.bytes_received, 4096);

        let done = tracker.finish();
        assert_eq!(done.percent, 100);
        assert_eq!(done.fill_percent, 100);
    }

    #[test]
    fn test_unknown_length_cap_holds_for_huge_streams() {
        let mut tracker = ProgressTracker::new(None);
        let report = tracker.record(usize::MAX / 2);
        assert_eq!(report.percent, UNKNOWN_LENGTH_CAP);
    }

    #[test]
    fn test_zero_length_counts_as_unknown() {
        let tracker = ProgressTracker::new(Some(0));
        assert_eq!(tracker.total_bytes(), None);
    }

    #[test]
    fn test_status_text() {
        let mut tracker = ProgressTracker::new(Some(2 * 1024 * 1024));
        let report = tracker.record(1024 * 1024);
        assert_eq!(report.status_text(), "Downloading... 50% (1.0 MB / 2.0 MB)");

        let mut tracker = ProgressTracker::new(None);
        let report = tracker.record(1024 * 1024);
        assert_eq!(report.status_text(), "Downloading... 1.0 MB received");
    }
}
