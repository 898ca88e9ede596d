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


//! Download controller: the per-channel download state machine
//!
//! ```text
//! Idle --start--> Starting --headers--> Streaming --end--> Finalizing --> Complete
//!                    |                      |                  |
//!                    +--------------------> Errored <----------+
//! ```
//!
//! - `start` needs a resolved source URL, otherwise `Precondition` and the
//!   machine stays `Idle` without any network call.
//! - While `Starting`, `Streaming` or `Finalizing` the trigger is disabled and
//!   a second `start` is rejected.
//! - Chunks are kept in arrival order and concatenated once at end-of-stream.
//! - `Complete` and `Errored` both end in the same reset: trigger re-enabled,
//!   progress surface collapsed, job dropped.

use crate::api::client::{MediaService, ResponseHead};
use crate::api::models::{DownloadRequest, Metadata};
use crate::channel::selection::SelectionUi;
use crate::channel::state::ChannelState;
use crate::channel::ChannelKind;
use crate::config::UiTimings;
use crate::download::filename::derive_filename;
use crate::download::progress::ProgressTracker;
use crate::download::save::{Artifact, ArtifactSink, SavedArtifact};
use crate::error::{ClipFetchError, Result};
use crate::ui::ChannelUi;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Message for a download attempted before resolution
pub const FETCH_INFO_FIRST_MESSAGE: &str = "Please fetch info first";

/// Lifecycle of a download job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No job
    Idle,
    /// Request sent, waiting for response headers
    Starting,
    /// Consuming the body
    Streaming,
    /// Assembling and saving the artifact
    Finalizing,
    /// Artifact saved
    Complete,
    /// Job failed
    Errored,
}

impl Phase {
    /// True while a job holds the channel
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Starting | Phase::Streaming | Phase::Finalizing)
    }
}

/// The in-flight job; dropped when the job ends either way
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadJob {
    pub id: Uuid,
    pub source_url: String,
    pub format_id: String,
    pub output_format: String,
    pub bytes_received: u64,
    pub total_bytes_expected: Option<u64>,
    pub phase: Phase,
    pub started_at: DateTime<Utc>,
}

/// Concatenate chunks in the order given
pub fn assemble_chunks(chunks: &[Bytes]) -> Vec<u8> {
    let total = chunks.iter().map(Bytes::len).sum();
    let mut buffer = Vec::with_capacity(total);
    for chunk in chunks {
        buffer.extend_from_slice(chunk);
    }
    buffer
}

pub struct DownloadController {
    kind: ChannelKind,
    service: Arc<dyn MediaService>,
    sink: Arc<dyn ArtifactSink>,
    timings: UiTimings,
    phase: Phase,
    job: Option<DownloadJob>,
}

impl DownloadController {
    pub fn new(
        kind: ChannelKind,
        service: Arc<dyn MediaService>,
        sink: Arc<dyn ArtifactSink>,
        timings: UiTimings,
    ) -> Self {
        Self {
            kind,
            service,
            sink,
            timings,
            phase: Phase::Idle,
            job: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The in-flight job, if any
    pub fn job(&self) -> Option<&DownloadJob> {
        self.job.as_ref()
    }

    fn set_phase(&mut self, phase: Phase) {
        tracing::debug!(channel = %self.kind, from = ?self.phase, to = ?phase, "phase");
        self.phase = phase;
        if let Some(job) = self.job.as_mut() {
            job.phase = phase;
        }
    }

    /// Run one download to completion or failure
    ///
    /// Reads the source URL from `state` and the chosen variant and output
    /// format from `selection`. Every outcome ends with the trigger enabled
    /// again; errors are also shown in the channel banner.
    ///
    /// `Channel` holds the controller by `&mut`, so overlapping calls cannot
    /// happen through it. The `InvalidState` check covers hosts that drive a
    /// controller directly and keep it in a busy phase.
    pub async fn start(
        &mut self,
        state: &ChannelState,
        selection: &SelectionUi,
        ui: &mut ChannelUi,
    ) -> Result<SavedArtifact> {
        if self.phase.is_busy() {
            return Err(ClipFetchError::InvalidState(format!(
                "a {} download is already running",
                self.kind
            )));
        }

        let Some(source_url) = state.source_url() else {
            let err = ClipFetchError::precondition(FETCH_INFO_FIRST_MESSAGE);
            ui.show_error(err.user_message(), self.timings.banner_duration);
            self.phase = Phase::Idle;
            return Err(err);
        };

        let job = DownloadJob {
            id: Uuid::new_v4(),
            source_url: source_url.to_string(),
            format_id: selection.selected_format_id().to_string(),
            output_format: selection.selected_output_format().to_string(),
            bytes_received: 0,
            total_bytes_expected: None,
            phase: Phase::Starting,
            started_at: Utc::now(),
        };
        tracing::info!(
            channel = %self.kind,
            job_id = %job.id,
            format_id = %job.format_id,
            output_format = %job.output_format,
            "download starting"
        );

        let request = DownloadRequest {
            url: job.source_url.clone(),
            format_id: job.format_id.clone(),
            mode: self.kind,
            output_format: job.output_format.clone(),
        };

        self.job = Some(job);
        self.set_phase(Phase::Starting);
        ui.dismiss_banner();
        ui.begin_download();

        let result = match self.service.open_download(&request).await {
            Ok(response) => {
                self.stream_response(response.head, response.body, state.metadata(), ui)
                    .await
            }
            Err(err) => Err(err.into_transfer()),
        };

        match result {
            Ok(saved) => {
                self.set_phase(Phase::Complete);
                self.finish_complete(&saved, ui).await;
                Ok(saved)
            }
            Err(err) => {
                self.set_phase(Phase::Errored);
                self.finish_errored(&err, ui);
                Err(err)
            }
        }
    }

    /// Consume a response body and hand the assembled artifact to the sink
    ///
    /// Drives `Streaming` and `Finalizing`. Requires a job created by
    /// [`start`](Self::start).
    async fn stream_response<S>(
        &mut self,
        head: ResponseHead,
        mut body: S,
        metadata: Option<&Metadata>,
        ui: &mut ChannelUi,
    ) -> Result<SavedArtifact>
    where
        S: Stream<Item = Result<Bytes>> + Unpin,
    {
        self.set_phase(Phase::Streaming);

        let mut tracker = ProgressTracker::new(head.content_length);
        if let Some(job) = self.job.as_mut() {
            job.total_bytes_expected = tracker.total_bytes();
        }

        let mut chunks: Vec<Bytes> = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(ClipFetchError::into_transfer)?;
            if chunk.is_empty() {
                continue;
            }

            let report = tracker.record(chunk.len());
            if let Some(job) = self.job.as_mut() {
                job.bytes_received = report.bytes_received;
            }
            ui.show_progress(&report);
            chunks.push(chunk);
        }

        self.set_phase(Phase::Finalizing);
        ui.show_progress(&tracker.finish());

        let (job_id, output_format) = match self.job.as_ref() {
            Some(job) => (job.id, job.output_format.clone()),
            None => return Err(ClipFetchError::InvalidState("no active job".to_string())),
        };

        let bytes = assemble_chunks(&chunks);
        drop(chunks);
        let filename = derive_filename(head.content_disposition.as_deref(), metadata, &output_format);
        tracing::info!(
            channel = %self.kind,
            %job_id,
            bytes = bytes.len(),
            filename = %filename,
            sink = self.sink.name(),
            "stream finished"
        );

        self.sink
            .save(Artifact {
                job_id,
                filename,
                content_type: head.content_type,
                bytes,
            })
            .await
            .map_err(ClipFetchError::into_transfer)
    }

    async fn finish_complete(&mut self, saved: &SavedArtifact, ui: &mut ChannelUi) {
        ui.show_complete(saved);
        tokio::time::sleep(self.timings.complete_display).await;
        ui.restore_trigger();
        tokio::time::sleep(self.timings.collapse_delay).await;
        ui.collapse_progress();
        self.job = None;
    }

    fn finish_errored(&mut self, err: &ClipFetchError, ui: &mut ChannelUi) {
        let job_id = self.job.as_ref().map(|j| j.id);
        tracing::error!(channel = %self.kind, job_id = ?job_id, kind = err.kind(), error = %err, "download failed");
        ui.show_error(err.user_message(), self.timings.banner_duration);
        ui.restore_trigger();
        ui.collapse_progress();
        self.job = None;
    }
}
