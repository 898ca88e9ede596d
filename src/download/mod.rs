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


//! Download pipeline
//!
//! - [`controller`] - per-channel state machine from trigger press to saved artifact
//! - [`progress`] - byte counting and percentage reporting
//! - [`filename`] - `Content-Disposition` parsing and fallback names
//! - [`save`] - where finished artifacts go

pub mod controller;
pub mod filename;
pub mod progress;
pub mod save;

pub use controller::{DownloadController, DownloadJob, Phase};
pub use progress::{ProgressMode, ProgressReport, ProgressTracker};
pub use save::{Artifact, ArtifactSink, FsSink, MemorySink, SavedArtifact};
