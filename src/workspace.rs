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


//! Workspace: both channels plus the tab bar

use crate::api::client::{MediaService, ServiceClient};
use crate::channel::{Channel, ChannelKind};
use crate::config::{ClientConfig, SaveConfig, UiTimings};
use crate::download::save::{ArtifactSink, FsSink};
use crate::error::Result;
use crate::ui::EventCallback;
use std::sync::Arc;

pub struct Workspace {
    video: Channel,
    audio: Channel,
    active: ChannelKind,
}

impl Workspace {
    /// Both channels share the service and the sink but nothing else
    pub fn new(service: Arc<dyn MediaService>, sink: Arc<dyn ArtifactSink>, timings: UiTimings) -> Self {
        Self {
            video: Channel::new(ChannelKind::Video, Arc::clone(&service), Arc::clone(&sink), timings),
            audio: Channel::new(ChannelKind::Audio, service, sink, timings),
            active: ChannelKind::default(),
        }
    }

    /// Workspace talking HTTP to the configured service and saving to disk
    pub fn connect(config: ClientConfig, save: SaveConfig, timings: UiTimings) -> Result<Self> {
        let client = ServiceClient::with_config(config)?;
        tracing::info!(base_url = %client.base_url(), output_dir = %save.output_directory.display(), "workspace ready");
        Ok(Self::new(Arc::new(client), Arc::new(FsSink::new(save)), timings))
    }

    pub fn channel(&self, kind: ChannelKind) -> &Channel {
        match kind {
            ChannelKind::Video => &self.video,
            ChannelKind::Audio => &self.audio,
        }
    }

    pub fn channel_mut(&mut self, kind: ChannelKind) -> &mut Channel {
        match kind {
            ChannelKind::Video => &mut self.video,
            ChannelKind::Audio => &mut self.audio,
        }
    }

    /// Disjoint borrows of (video, audio) for driving both at once
    pub fn channels_mut(&mut self) -> (&mut Channel, &mut Channel) {
        (&mut self.video, &mut self.audio)
    }

    /// Channel whose tab is selected
    pub fn active(&self) -> ChannelKind {
        self.active
    }

    /// Select a tab; only the selected channel's surface is visible
    ///
    /// Switching tabs never touches the state or downloads of either channel.
    pub fn activate_tab(&mut self, kind: ChannelKind) {
        self.active = kind;
        for other in ChannelKind::ALL {
            self.channel_mut(other).ui_mut().set_visible(other == kind);
        }
    }

    /// Install one callback on both channels
    pub fn set_event_callback(&mut self, callback: EventCallback) {
        self.video.set_event_callback(Arc::clone(&callback));
        self.audio.set_event_callback(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::DownloadResponse;
    use crate::api::models::{DownloadRequest, Metadata};
    use crate::download::controller::Phase;
    use crate::download::save::MemorySink;
    use crate::error::ClipFetchError;
    use async_trait::async_trait;

    struct EchoService;

    #[async_trait]
    impl MediaService for EchoService {
        async fn resolve(&self, media_url: &str) -> Result<Metadata> {
            if media_url.contains("bad") {
                return Err(ClipFetchError::resolution(Some("Unsupported URL".to_string()), Some(400)));
            }
            Ok(Metadata {
                title: media_url.to_string(),
                channel_name: String::new(),
                duration_seconds: 0,
                view_count: 0,
                thumbnail_url: String::new(),
                video_variants: Vec::new(),
                audio_variants: Vec::new(),
            })
        }

        async fn open_download(&self, _request: &DownloadRequest) -> Result<DownloadResponse> {
            Err(ClipFetchError::transfer(None, None))
        }
    }

    fn workspace() -> Workspace {
        Workspace::new(Arc::new(EchoService), Arc::new(MemorySink::new()), UiTimings::immediate())
    }

    #[test]
    fn test_tabs_toggle_visibility() {
        let mut ws = workspace();
        assert_eq!(ws.active(), ChannelKind::Video);
        assert!(ws.channel(ChannelKind::Video).ui().is_visible());
        assert!(!ws.channel(ChannelKind::Audio).ui().is_visible());

        ws.activate_tab(ChannelKind::Audio);
        assert_eq!(ws.active(), ChannelKind::Audio);
        assert!(!ws.channel(ChannelKind::Video).ui().is_visible());
        assert!(ws.channel(ChannelKind::Audio).ui().is_visible());
    }

    #[tokio::test]
    async fn test_channels_are_isolated() {
        let mut ws = workspace();
        let (video, audio) = ws.channels_mut();

        let (v, a) = tokio::join!(
            video.submit_url("https://media.example/ok"),
            audio.submit_url("https://media.example/bad"),
        );
        assert!(v.is_ok());
        assert!(a.is_err());

        let video = ws.channel(ChannelKind::Video);
        let audio = ws.channel(ChannelKind::Audio);
        assert_eq!(video.state().source_url(), Some("https://media.example/ok"));
        assert!(video.ui().banner().is_none());
        assert!(audio.state().source_url().is_none());
        assert_eq!(audio.ui().banner().map(|b| b.message.as_str()), Some("Unsupported URL"));
        assert_eq!(audio.phase(), Phase::Idle);
    }
}
