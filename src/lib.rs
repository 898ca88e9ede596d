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


//! ClipFetch core
//!
//! Client side of a media retrieval service. A [`Workspace`] holds a video
//! and an audio [`Channel`]; each resolves a page URL into metadata, lets
//! the user pick a quality and output format, and streams the chosen
//! variant into an [`ArtifactSink`](download::ArtifactSink) while reporting
//! progress through [`ChannelUi`](ui::ChannelUi).

uniffi::setup_scaffolding!();

pub mod api;
pub mod channel;
pub mod config;
pub mod download;
pub mod error;
pub mod format;
pub mod ui;
pub mod workspace;

pub use api::{MediaService, Metadata, ServiceClient};
pub use channel::{Channel, ChannelKind};
pub use config::{ClientConfig, SaveConfig, UiTimings};
pub use download::{FsSink, SavedArtifact};
pub use error::{ClipFetchError, Result};
pub use workspace::Workspace;
