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


//! Metadata resolver
//!
//! Validates the user's URL, asks the service for metadata, and on success
//! records it in the channel state and repopulates the selection UI. The
//! loading indicator is on for the duration of the request and is turned
//! off on every exit path.

use crate::api::client::MediaService;
use crate::api::models::Metadata;
use crate::channel::selection::SelectionUi;
use crate::channel::state::ChannelState;
use crate::channel::ChannelKind;
use crate::config::UiTimings;
use crate::error::{ClipFetchError, Result};
use crate::ui::ChannelUi;
use std::sync::Arc;

/// Message for an empty URL field
pub const MISSING_URL_MESSAGE: &str = "Please enter a URL";

pub struct MetadataResolver {
    service: Arc<dyn MediaService>,
    timings: UiTimings,
}

impl MetadataResolver {
    pub fn new(service: Arc<dyn MediaService>, timings: UiTimings) -> Self {
        Self { service, timings }
    }

    /// Resolve `raw_url` for one channel
    ///
    /// Whitespace-only input fails with `Validation` without touching the
    /// network. Failures leave the previous state untouched and show a
    /// banner on the channel.
    pub async fn resolve(
        &self,
        kind: ChannelKind,
        state: &mut ChannelState,
        selection: &mut SelectionUi,
        ui: &mut ChannelUi,
        raw_url: &str,
    ) -> Result<Metadata> {
        let url = raw_url.trim();
        if url.is_empty() {
            let err = ClipFetchError::validation(MISSING_URL_MESSAGE);
            ui.show_error(err.user_message(), self.timings.banner_duration);
            return Err(err);
        }

        ui.dismiss_banner();
        ui.begin_loading();
        tracing::info!(channel = %kind, url, "resolving");

        let result = self.service.resolve(url).await.map_err(ClipFetchError::into_resolution);
        ui.end_loading();

        match result {
            Ok(metadata) => {
                tracing::info!(
                    channel = %kind,
                    title = %metadata.title,
                    variants = metadata.variants(kind).len(),
                    "resolved"
                );
                state.record_resolution(url.to_string(), metadata.clone());
                selection.populate(&metadata);
                Ok(metadata)
            }
            Err(err) => {
                tracing::warn!(channel = %kind, error = %err, "resolution failed");
                ui.show_error(err.user_message(), self.timings.banner_duration);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::DownloadResponse;
    use crate::api::models::DownloadRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingService {
        calls: AtomicUsize,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl MediaService for CountingService {
        async fn resolve(&self, _media_url: &str) -> Result<Metadata> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.fail_with {
                return Err(ClipFetchError::resolution(Some(message.clone()), Some(500)));
            }
            Ok(Metadata {
                title: "Clip".to_string(),
                channel_name: "Uploader".to_string(),
                duration_seconds: 1,
                view_count: 1,
                thumbnail_url: String::new(),
                video_variants: Vec::new(),
                audio_variants: Vec::new(),
            })
        }

        async fn open_download(&self, _request: &DownloadRequest) -> Result<DownloadResponse> {
            Err(ClipFetchError::transfer(None, None))
        }
    }

    fn setup(fail_with: Option<&str>) -> (Arc<CountingService>, MetadataResolver, ChannelState, SelectionUi, ChannelUi) {
        let service = Arc::new(CountingService {
            calls: AtomicUsize::new(0),
            fail_with: fail_with.map(String::from),
        });
        let resolver = MetadataResolver::new(service.clone(), UiTimings::default());
        (
            service,
            resolver,
            ChannelState::new(),
            SelectionUi::new(ChannelKind::Video),
            ChannelUi::new(ChannelKind::Video),
        )
    }

    #[tokio::test]
    async fn test_blank_url_never_reaches_network() {
        let (service, resolver, mut state, mut selection, mut ui) = setup(None);

        for raw in ["", "   ", "\t\n"] {
            let err = resolver
                .resolve(ChannelKind::Video, &mut state, &mut selection, &mut ui, raw)
                .await
                .unwrap_err();
            assert!(matches!(err, ClipFetchError::Validation(_)));
        }
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert_eq!(ui.banner().map(|b| b.message.as_str()), Some(MISSING_URL_MESSAGE));
        assert!(!state.is_resolved());
    }

    #[tokio::test]
    async fn test_success_records_trimmed_url() {
        let (service, resolver, mut state, mut selection, mut ui) = setup(None);

        resolver
            .resolve(ChannelKind::Video, &mut state, &mut selection, &mut ui, "  https://media.example/v  ")
            .await
            .unwrap();

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.source_url(), Some("https://media.example/v"));
        assert!(!ui.is_loading());
        assert!(ui.submit_enabled());
        assert_eq!(selection.metadata_view().map(|v| v.title.as_str()), Some("Clip"));
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_state() {
        let (_, ok_resolver, mut state, mut selection, mut ui) = setup(None);
        ok_resolver
            .resolve(ChannelKind::Video, &mut state, &mut selection, &mut ui, "https://first")
            .await
            .unwrap();

        let (service, failing, _, _, _) = setup(Some("Unsupported URL"));
        let err = failing
            .resolve(ChannelKind::Video, &mut state, &mut selection, &mut ui, "https://second")
            .await
            .unwrap_err();

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.user_message(), "Unsupported URL");
        assert_eq!(state.source_url(), Some("https://first"));
        assert!(!ui.is_loading());
        assert_eq!(ui.banner().map(|b| b.message.as_str()), Some("Unsupported URL"));
    }
}
