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


//! Wire types of the extraction service and the metadata model built from them
//!
//! The service reports numbers the way its extractor found them: sizes and
//! durations may be missing, `null`, or floats. Everything optional on the
//! wire is an `Option` here with a defined fallback.

use crate::channel::ChannelKind;
use serde::{Deserialize, Deserializer, Serialize};

/// Title used when the service omits one
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Body of `POST /process`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolveRequest {
    pub url: String,
}

/// Successful body of `POST /process`
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveResponse {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub channel: Option<String>,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub duration: Option<u64>,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub view_count: Option<u64>,

    #[serde(default)]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub video_formats: Option<Vec<FormatEntry>>,

    #[serde(default)]
    pub audio_formats: Option<Vec<FormatEntry>>,
}

/// One entry of `video_formats` / `audio_formats`
#[derive(Debug, Clone, Deserialize)]
pub struct FormatEntry {
    pub format_id: String,

    #[serde(default)]
    pub quality: Option<String>,

    #[serde(default)]
    pub ext: Option<String>,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub filesize: Option<u64>,
}

/// Body of `POST /download`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub format_id: String,
    pub mode: ChannelKind,
    pub output_format: String,
}

/// Error body returned with a non-2xx status
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Accept integers, floats (truncated), strings of digits, or null
fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64),
        _ => None,
    })
}

/// A selectable encoding of the resolved media
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Opaque id, echoed back verbatim in the download request
    pub format_id: String,
    /// Display quality, e.g. "1080p" or "128kbps"
    pub quality_label: String,
    /// Size in bytes when the extractor knows it
    pub file_size_bytes: Option<u64>,
    /// Container extension reported by the extractor
    pub extension: Option<String>,
}

impl From<FormatEntry> for Variant {
    fn from(entry: FormatEntry) -> Self {
        let quality_label = entry
            .quality
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| entry.format_id.clone());
        Self {
            format_id: entry.format_id,
            quality_label,
            file_size_bytes: entry.filesize,
            extension: entry.ext,
        }
    }
}

/// Everything the service told us about one media URL
///
/// Immutable once received; a new resolution replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub channel_name: String,
    pub duration_seconds: u64,
    pub view_count: u64,
    pub thumbnail_url: String,
    pub video_variants: Vec<Variant>,
    pub audio_variants: Vec<Variant>,
}

impl Metadata {
    /// Variant list matching a channel kind, in server order
    pub fn variants(&self, kind: ChannelKind) -> &[Variant] {
        match kind {
            ChannelKind::Video => &self.video_variants,
            ChannelKind::Audio => &self.audio_variants,
        }
    }
}

impl From<ResolveResponse> for Metadata {
    fn from(response: ResolveResponse) -> Self {
        let convert = |list: Option<Vec<FormatEntry>>| -> Vec<Variant> {
            list.unwrap_or_default().into_iter().map(Variant::from).collect()
        };

        Self {
            title: response
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            channel_name: response
                .channel
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            duration_seconds: response.duration.unwrap_or(0),
            view_count: response.view_count.unwrap_or(0),
            thumbnail_url: response.thumbnail.unwrap_or_default(),
            video_variants: convert(response.video_formats),
            audio_variants: convert(response.audio_formats),
        }
    }
}
