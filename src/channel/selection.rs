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


//! Selection UI: quality and output-format selectors plus the metadata card
//!
//! The quality list always starts with the `best` sentinel, followed by the
//! variants in exactly the order the service returned them.

use crate::api::models::{Metadata, Variant};
use crate::channel::ChannelKind;
use crate::error::{ClipFetchError, Result};
use crate::format::{format_duration, format_file_size, format_view_count};
use serde::Serialize;

/// Sentinel format id meaning "let the server choose"
pub const BEST_FORMAT_ID: &str = "best";

/// Label of the sentinel option
pub const BEST_LABEL: &str = "Best Available";

/// One entry of the quality selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityOption {
    pub format_id: String,
    pub label: String,
}

impl QualityOption {
    fn best() -> Self {
        Self {
            format_id: BEST_FORMAT_ID.to_string(),
            label: BEST_LABEL.to_string(),
        }
    }
}

impl From<&Variant> for QualityOption {
    fn from(variant: &Variant) -> Self {
        let label = match format_file_size(variant.file_size_bytes) {
            Some(size) => format!("{} ({})", variant.quality_label, size),
            None => variant.quality_label.clone(),
        };
        Self {
            format_id: variant.format_id.clone(),
            label,
        }
    }
}

/// Display strings for the resolved media
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataView {
    pub title: String,
    pub channel_name: String,
    pub duration_text: String,
    pub views_text: String,
    pub thumbnail_url: String,
}

impl From<&Metadata> for MetadataView {
    fn from(metadata: &Metadata) -> Self {
        Self {
            title: metadata.title.clone(),
            channel_name: metadata.channel_name.clone(),
            duration_text: format_duration(metadata.duration_seconds),
            views_text: format_view_count(metadata.view_count),
            thumbnail_url: metadata.thumbnail_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionUi {
    kind: ChannelKind,
    quality_options: Vec<QualityOption>,
    selected_format_id: String,
    selected_output_format: String,
    metadata_view: Option<MetadataView>,
}

impl SelectionUi {
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            quality_options: vec![QualityOption::best()],
            selected_format_id: BEST_FORMAT_ID.to_string(),
            selected_output_format: kind.default_output_format().to_string(),
            metadata_view: None,
        }
    }

    /// Rebuild the selectors from freshly resolved metadata
    ///
    /// The quality selection falls back to `best`; the output format choice
    /// is kept.
    pub fn populate(&mut self, metadata: &Metadata) {
        self.quality_options = std::iter::once(QualityOption::best())
            .chain(metadata.variants(self.kind).iter().map(QualityOption::from))
            .collect();
        self.selected_format_id = BEST_FORMAT_ID.to_string();
        self.metadata_view = Some(MetadataView::from(metadata));
    }

    pub fn quality_options(&self) -> &[QualityOption] {
        &self.quality_options
    }

    /// Labels in display order
    pub fn quality_labels(&self) -> Vec<&str> {
        self.quality_options.iter().map(|o| o.label.as_str()).collect()
    }

    pub fn output_formats(&self) -> &'static [&'static str] {
        self.kind.output_formats()
    }

    pub fn metadata_view(&self) -> Option<&MetadataView> {
        self.metadata_view.as_ref()
    }

    pub fn selected_format_id(&self) -> &str {
        &self.selected_format_id
    }

    pub fn selected_output_format(&self) -> &str {
        &self.selected_output_format
    }

    /// Choose a quality by format id
    pub fn select_quality(&mut self, format_id: &str) -> Result<()> {
        if !self.quality_options.iter().any(|o| o.format_id == format_id) {
            return Err(ClipFetchError::validation(format!(
                "quality '{}' is not offered",
                format_id
            )));
        }
        self.selected_format_id = format_id.to_string();
        Ok(())
    }

    /// Choose an output container; a leading dot is ignored
    pub fn select_output_format(&mut self, output_format: &str) -> Result<()> {
        let token = output_format.trim().trim_start_matches('.').to_ascii_lowercase();
        match self.output_formats().iter().find(|f| **f == token) {
            Some(found) => {
                self.selected_output_format = (*found).to_string();
                Ok(())
            }
            None => Err(ClipFetchError::validation(format!(
                "output format '{}' is not offered for {}",
                output_format, self.kind
            ))),
        }
    }
}
