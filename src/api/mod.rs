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


//! Media service client
//!
//! The service exposes three endpoints relative to a configurable base URL:
//!
//! - `POST process` - resolve a page URL into [`models::Metadata`]
//! - `POST download` - stream the selected variant as a binary body
//! - `GET health` - liveness probe

pub mod client;
pub mod models;

pub use client::{DownloadResponse, MediaService, ResponseHead, ServiceClient};
pub use models::{DownloadRequest, Metadata, Variant};
