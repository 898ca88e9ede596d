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


//! Per-channel UI surface
//!
//! Plain state that a renderer observes: the loading indicator around
//! resolution, the download trigger, the progress surface and the transient
//! error banner. Each mutation is also pushed to an optional event callback
//! so a renderer can redraw without polling.

use crate::channel::ChannelKind;
use crate::download::progress::{ProgressMode, ProgressReport};
use crate::download::save::SavedArtifact;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Trigger caption while a job runs
pub const BUSY_CAPTION: &str = "Downloading...";

/// Status text shown while waiting for response headers
pub const STARTING_STATUS: &str = "Starting download...";

/// Status text shown after a successful save
pub const COMPLETE_STATUS: &str = "Download complete!";

/// What changed on a channel's surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UiUpdate {
    /// Resolution started (`true`) or ended (`false`)
    Loading(bool),
    /// Trigger enabled state and caption
    Trigger { enabled: bool, caption: String },
    /// Progress surface contents
    Progress {
        visible: bool,
        percent: u8,
        fill_percent: u8,
        status_text: String,
    },
    /// Artifact handed to the save mechanism
    Saved(SavedArtifact),
    /// Error banner shown
    ///
    /// Expiry is not announced with a later event: renderers driven by the
    /// callback hide the banner themselves once `duration` has passed.
    Banner { message: String, duration: Duration },
    /// Error banner closed early by [`ChannelUi::dismiss_banner`]
    BannerDismissed,
    /// Channel shown or hidden by tab activation
    Visibility(bool),
}

/// A surface change on one channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelEvent {
    pub channel: ChannelKind,
    pub update: UiUpdate,
}

/// Callback type for surface updates
pub type EventCallback = Arc<dyn Fn(ChannelEvent) + Send + Sync>;

/// Download trigger button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerControl {
    pub enabled: bool,
    pub caption: String,
    default_caption: String,
}

impl TriggerControl {
    fn new(default_caption: String) -> Self {
        Self {
            enabled: true,
            caption: default_caption.clone(),
            default_caption,
        }
    }

    pub fn default_caption(&self) -> &str {
        &self.default_caption
    }
}

/// Progress bar plus status line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressSurface {
    pub visible: bool,
    pub percent: u8,
    pub fill_percent: u8,
    pub indeterminate: bool,
    pub status_text: String,
}

/// Transient, auto-dismissing error notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    pub expires_at: Instant,
}

/// Everything the user sees for one channel
pub struct ChannelUi {
    kind: ChannelKind,
    visible: bool,
    loading: bool,
    submit_enabled: bool,
    trigger: TriggerControl,
    progress: ProgressSurface,
    banner: Option<Banner>,
    on_event: Option<EventCallback>,
}

impl std::fmt::Debug for ChannelUi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelUi")
            .field("kind", &self.kind)
            .field("visible", &self.visible)
            .field("loading", &self.loading)
            .field("trigger", &self.trigger)
            .field("progress", &self.progress)
            .field("banner", &self.banner)
            .finish_non_exhaustive()
    }
}

impl ChannelUi {
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            visible: kind == ChannelKind::default(),
            loading: false,
            submit_enabled: true,
            trigger: TriggerControl::new(kind.download_caption().to_string()),
            progress: ProgressSurface::default(),
            banner: None,
            on_event: None,
        }
    }

    /// Register the callback that receives every surface update
    pub fn set_event_callback(&mut self, callback: EventCallback) {
        self.on_event = Some(callback);
    }

    fn emit(&self, update: UiUpdate) {
        if let Some(cb) = &self.on_event {
            cb(ChannelEvent {
                channel: self.kind,
                update,
            });
        }
    }

    fn emit_trigger(&self) {
        self.emit(UiUpdate::Trigger {
            enabled: self.trigger.enabled,
            caption: self.trigger.caption.clone(),
        });
    }

    fn emit_progress(&self) {
        self.emit(UiUpdate::Progress {
            visible: self.progress.visible,
            percent: self.progress.percent,
            fill_percent: self.progress.fill_percent,
            status_text: self.progress.status_text.clone(),
        });
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn trigger(&self) -> &TriggerControl {
        &self.trigger
    }

    pub fn progress(&self) -> &ProgressSurface {
        &self.progress
    }

    /// The banner, if one is showing and has not expired
    ///
    /// Expiry is checked on read; polling renderers call this on each frame.
    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref().filter(|b| Instant::now() < b.expires_at)
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.emit(UiUpdate::Visibility(visible));
        }
    }

    // ===== Resolution =====

    pub(crate) fn begin_loading(&mut self) {
        self.loading = true;
        self.submit_enabled = false;
        self.emit(UiUpdate::Loading(true));
    }

    pub(crate) fn end_loading(&mut self) {
        self.loading = false;
        self.submit_enabled = true;
        self.emit(UiUpdate::Loading(false));
    }

    // ===== Download =====

    pub(crate) fn begin_download(&mut self) {
        self.trigger.enabled = false;
        self.trigger.caption = BUSY_CAPTION.to_string();
        self.emit_trigger();

        self.progress = ProgressSurface {
            visible: true,
            percent: 0,
            fill_percent: 0,
            indeterminate: false,
            status_text: STARTING_STATUS.to_string(),
        };
        self.emit_progress();
    }

    pub(crate) fn show_progress(&mut self, report: &ProgressReport) {
        self.progress.visible = true;
        self.progress.percent = report.percent;
        self.progress.fill_percent = report.fill_percent;
        self.progress.indeterminate = report.mode == ProgressMode::Indeterminate;
        self.progress.status_text = report.status_text();
        self.emit_progress();
    }

    pub(crate) fn show_complete(&mut self, saved: &SavedArtifact) {
        self.progress.visible = true;
        self.progress.percent = 100;
        self.progress.fill_percent = 100;
        self.progress.indeterminate = false;
        self.progress.status_text = COMPLETE_STATUS.to_string();
        self.emit_progress();
        self.emit(UiUpdate::Saved(saved.clone()));
    }

    pub(crate) fn restore_trigger(&mut self) {
        self.trigger.enabled = true;
        self.trigger.caption = self.trigger.default_caption.clone();
        self.emit_trigger();
    }

    pub(crate) fn collapse_progress(&mut self) {
        self.progress = ProgressSurface::default();
        self.emit_progress();
    }

    // ===== Banner =====

    pub(crate) fn show_error(&mut self, message: String, duration: Duration) {
        self.banner = Some(Banner {
            message: message.clone(),
            expires_at: Instant::now() + duration,
        });
        self.emit(UiUpdate::Banner { message, duration });
    }

    /// Close the banner early
    pub fn dismiss_banner(&mut self) {
        if self.banner.take().is_some() {
            self.emit(UiUpdate::BannerDismissed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_download_cycle_restores_defaults() {
        let mut ui = ChannelUi::new(ChannelKind::Audio);
        assert!(ui.trigger().enabled);
        assert_eq!(ui.trigger().caption, "Download Audio");

        ui.begin_download();
        assert!(!ui.trigger().enabled);
        assert_eq!(ui.trigger().caption, BUSY_CAPTION);
        assert!(ui.progress().visible);

        ui.restore_trigger();
        ui.collapse_progress();
        assert!(ui.trigger().enabled);
        assert_eq!(ui.trigger().caption, "Download Audio");
        assert!(!ui.progress().visible);
        assert_eq!(ui.progress().percent, 0);
    }

    #[test]
    fn test_loading_toggles_submit() {
        let mut ui = ChannelUi::new(ChannelKind::Video);
        ui.begin_loading();
        assert!(ui.is_loading());
        assert!(!ui.submit_enabled());
        ui.end_loading();
        assert!(!ui.is_loading());
        assert!(ui.submit_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_expires() {
        let mut ui = ChannelUi::new(ChannelKind::Video);
        ui.show_error("rate limited".to_string(), Duration::from_secs(5));
        assert_eq!(ui.banner().map(|b| b.message.as_str()), Some("rate limited"));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(ui.banner().is_none());
    }

    #[test]
    fn test_banner_event_carries_lifetime() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut ui = ChannelUi::new(ChannelKind::Video);
        ui.set_event_callback(Arc::new(move |event: ChannelEvent| sink.lock().unwrap().push(event.update)));
        ui.show_error("rate limited".to_string(), Duration::from_secs(5));
        ui.dismiss_banner();

        let updates = seen.lock().unwrap();
        assert_eq!(
            updates.as_slice(),
            &[
                UiUpdate::Banner {
                    message: "rate limited".to_string(),
                    duration: Duration::from_secs(5),
                },
                UiUpdate::BannerDismissed,
            ]
        );
    }

    #[test]
    fn test_dismiss_banner() {
        let mut ui = ChannelUi::new(ChannelKind::Video);
        ui.show_error("boom".to_string(), Duration::from_secs(60));
        ui.dismiss_banner();
        assert!(ui.banner().is_none());
    }

    #[test]
    fn test_events_are_tagged_with_channel() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut ui = ChannelUi::new(ChannelKind::Audio);
        ui.set_event_callback(Arc::new(move |event| sink.lock().unwrap().push(event)));
        ui.begin_loading();

        let events = seen.lock().unwrap();
        assert_eq!(
            events.as_slice(),
            &[ChannelEvent {
                channel: ChannelKind::Audio,
                update: UiUpdate::Loading(true),
            }]
        );
    }
}
