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


//! Channels
//!
//! The workspace has two independent channels, one for video and one for
//! audio. Each owns its own state, selection UI, progress surface, banner
//! and download controller, so nothing one channel does can be observed by
//! the other.

pub mod resolver;
pub mod selection;
pub mod state;

use crate::api::client::MediaService;
use crate::api::models::Metadata;
use crate::config::UiTimings;
use crate::download::controller::{DownloadController, Phase};
use crate::download::save::{ArtifactSink, SavedArtifact};
use crate::error::Result;
use crate::ui::{ChannelUi, EventCallback};
use resolver::MetadataResolver;
use selection::SelectionUi;
use serde::{Deserialize, Serialize};
use state::ChannelState;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

const VIDEO_OUTPUT_FORMATS: &[&str] = &["mp4", "mkv", "webm"];
const AUDIO_OUTPUT_FORMATS: &[&str] = &["mp3", "m4a", "aac", "ogg"];

/// Which channel a request or event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Video,
    Audio,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 2] = [ChannelKind::Video, ChannelKind::Audio];

    /// Wire name, also used as the `mode` of a download request
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Video => "video",
            ChannelKind::Audio => "audio",
        }
    }

    /// Idle caption of the download trigger
    pub fn download_caption(self) -> &'static str {
        match self {
            ChannelKind::Video => "Download Video",
            ChannelKind::Audio => "Download Audio",
        }
    }

    /// Output formats offered, default first
    pub fn output_formats(self) -> &'static [&'static str] {
        match self {
            ChannelKind::Video => VIDEO_OUTPUT_FORMATS,
            ChannelKind::Audio => AUDIO_OUTPUT_FORMATS,
        }
    }

    pub fn default_output_format(self) -> &'static str {
        self.output_formats()[0]
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChannelKind {
    type Err = crate::error::ClipFetchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(ChannelKind::Video),
            "audio" => Ok(ChannelKind::Audio),
            other => Err(crate::error::ClipFetchError::validation(format!(
                "Unknown mode '{}'",
                other
            ))),
        }
    }
}

/// One media channel: resolve, pick, download
pub struct Channel {
    kind: ChannelKind,
    state: ChannelState,
    selection: SelectionUi,
    ui: ChannelUi,
    resolver: MetadataResolver,
    controller: DownloadController,
    timings: UiTimings,
}

impl Channel {
    pub fn new(
        kind: ChannelKind,
        service: Arc<dyn MediaService>,
        sink: Arc<dyn ArtifactSink>,
        timings: UiTimings,
    ) -> Self {
        Self {
            kind,
            state: ChannelState::new(),
            selection: SelectionUi::new(kind),
            ui: ChannelUi::new(kind),
            resolver: MetadataResolver::new(Arc::clone(&service), timings),
            controller: DownloadController::new(kind, service, sink, timings),
            timings,
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    pub fn selection(&self) -> &SelectionUi {
        &self.selection
    }

    pub fn ui(&self) -> &ChannelUi {
        &self.ui
    }

    pub(crate) fn ui_mut(&mut self) -> &mut ChannelUi {
        &mut self.ui
    }

    pub fn set_event_callback(&mut self, callback: EventCallback) {
        self.ui.set_event_callback(callback);
    }

    /// Submit the URL field
    pub async fn submit_url(&mut self, raw_url: &str) -> Result<Metadata> {
        self.resolver
            .resolve(self.kind, &mut self.state, &mut self.selection, &mut self.ui, raw_url)
            .await
    }

    /// Choose a quality by format id
    pub fn select_quality(&mut self, format_id: &str) -> Result<()> {
        let result = self.selection.select_quality(format_id);
        self.report(result)
    }

    /// Choose an output format
    pub fn select_output_format(&mut self, output_format: &str) -> Result<()> {
        let result = self.selection.select_output_format(output_format);
        self.report(result)
    }

    /// Press the download trigger
    pub async fn download(&mut self) -> Result<SavedArtifact> {
        self.controller
            .start(&self.state, &self.selection, &mut self.ui)
            .await
    }

    /// Id of the in-flight download job
    pub fn active_job_id(&self) -> Option<Uuid> {
        self.controller.job().map(|job| job.id)
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn dismiss_banner(&mut self) {
        self.ui.dismiss_banner();
    }

    fn report(&mut self, result: Result<()>) -> Result<()> {
        if let Err(err) = &result {
            self.ui.show_error(err.user_message(), self.timings.banner_duration);
        }
        result
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("phase", &self.controller.phase())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::DownloadResponse;
    use crate::api::models::{DownloadRequest, Variant};
    use crate::download::save::MemorySink;
    use crate::error::ClipFetchError;
    use async_trait::async_trait;

    struct FixedService(Metadata);

    #[async_trait]
    impl MediaService for FixedService {
        async fn resolve(&self, _media_url: &str) -> Result<Metadata> {
            Ok(self.0.clone())
        }

        async fn open_download(&self, _request: &DownloadRequest) -> Result<DownloadResponse> {
            Err(ClipFetchError::transfer(None, Some(500)))
        }
    }

    fn channel(kind: ChannelKind) -> Channel {
        let metadata = Metadata {
            title: "Clip".to_string(),
            channel_name: "Someone".to_string(),
            duration_seconds: 60,
            view_count: 10,
            thumbnail_url: String::new(),
            video_variants: vec![Variant {
                format_id: "137".to_string(),
                quality_label: "1080p".to_string(),
                file_size_bytes: None,
                extension: Some("mp4".to_string()),
            }],
            audio_variants: Vec::new(),
        };
        Channel::new(
            kind,
            Arc::new(FixedService(metadata)),
            Arc::new(MemorySink::new()),
            UiTimings::immediate(),
        )
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ChannelKind::default(), ChannelKind::Video);
        assert_eq!(ChannelKind::Audio.to_string(), "audio");
        assert_eq!(serde_json::to_string(&ChannelKind::Video).unwrap(), "\"video\"");
        assert_eq!("AUDIO".parse::<ChannelKind>().unwrap(), ChannelKind::Audio);
        assert!("podcast".parse::<ChannelKind>().is_err());
        assert_eq!(ChannelKind::Audio.default_output_format(), "mp3");
    }

    #[tokio::test]
    async fn test_select_after_resolution() {
        let mut channel = channel(ChannelKind::Video);
        channel.submit_url("https://media.example/v").await.unwrap();

        channel.select_quality("137").unwrap();
        channel.select_output_format("MKV").unwrap();
        assert_eq!(channel.selection().selected_format_id(), "137");
        assert_eq!(channel.selection().selected_output_format(), "mkv");
    }

    #[tokio::test]
    async fn test_invalid_selection_shows_banner() {
        let mut channel = channel(ChannelKind::Video);
        assert!(channel.select_quality("999").is_err());
        assert!(channel.ui().banner().is_some());
        assert_eq!(channel.phase(), Phase::Idle);
        assert!(channel.active_job_id().is_none());
    }

    #[tokio::test]
    async fn test_failed_download_clears_job() {
        let mut channel = channel(ChannelKind::Audio);
        channel.submit_url("https://media.example/a").await.unwrap();

        let err = channel.download().await.unwrap_err();
        assert_eq!(err.user_message(), crate::error::GENERIC_TRANSFER_MESSAGE);
        assert_eq!(channel.phase(), Phase::Errored);
        assert!(channel.active_job_id().is_none());
        assert!(channel.ui().trigger().enabled);
    }
}
