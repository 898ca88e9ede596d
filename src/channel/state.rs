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


//! Channel state: the last successful resolution
//!
//! Created empty. Only the metadata resolver writes it, and only on
//! success; the download controller reads it. Nothing ever clears it, a
//! later successful resolution simply overwrites both fields.

use crate::api::models::Metadata;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelState {
    source_url: Option<String>,
    metadata: Option<Metadata>,
}

impl ChannelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL of the last successful resolution
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Metadata of the last successful resolution
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// True once a resolution has succeeded
    pub fn is_resolved(&self) -> bool {
        self.source_url.is_some()
    }

    pub(crate) fn record_resolution(&mut self, source_url: String, metadata: Metadata) {
        self.source_url = Some(source_url);
        self.metadata = Some(metadata);
    }
}
