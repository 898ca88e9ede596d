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


//! Local persistence of finished downloads
//!
//! The download controller hands every finished artifact to an
//! [`ArtifactSink`]. [`FsSink`] writes into an output directory;
//! [`MemorySink`] keeps artifacts in memory for hosts that render or
//! forward the bytes themselves.

use crate::config::SaveConfig;
use crate::download::filename::{extension_for, FALLBACK_STEM, GENERIC_EXTENSION};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use uuid::Uuid;

const WRITE_BUFF_SZ: usize = 64 * 1024;
const MAX_COLLISION_SUFFIX: u32 = 1000;

/// A fully assembled download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Job that produced it
    pub job_id: Uuid,
    /// Derived output filename
    pub filename: String,
    /// Declared content type
    pub content_type: String,
    /// Body bytes in arrival order
    pub bytes: Vec<u8>,
}

/// Where an artifact ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedArtifact {
    pub job_id: Uuid,
    pub filename: String,
    /// Final location; `None` for sinks that do not write files
    pub path: Option<PathBuf>,
    pub size_bytes: u64,
    pub saved_at: DateTime<Utc>,
}

/// Platform save mechanism
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Name of the sink (for logging)
    fn name(&self) -> &'static str;

    /// Persist one artifact
    async fn save(&self, artifact: Artifact) -> Result<SavedArtifact>;
}

/// Writes artifacts into a directory
#[derive(Debug, Clone)]
pub struct FsSink {
    config: SaveConfig,
}

impl FsSink {
    pub fn new(config: SaveConfig) -> Self {
        Self { config }
    }

    /// Sink writing into `dir`, never overwriting
    pub fn in_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self::new(SaveConfig {
            output_directory: dir.into(),
            ..SaveConfig::default()
        })
    }

    pub fn output_directory(&self) -> &Path {
        &self.config.output_directory
    }

    /// Name tried for the `attempt`-th collision; 0 is the name itself
    fn candidate_path(&self, filename: &str, attempt: u32) -> PathBuf {
        if attempt == 0 {
            return self.config.output_directory.join(filename);
        }
        let (stem, extension) = split_extension(filename);
        let name = match (attempt < MAX_COLLISION_SUFFIX, extension) {
            (true, Some(ext)) => format!("{} ({}).{}", stem, attempt, ext),
            (true, None) => format!("{} ({})", stem, attempt),
            (false, ext) => format!("{} {}.{}", stem, Uuid::new_v4(), ext.unwrap_or(GENERIC_EXTENSION)),
        };
        self.config.output_directory.join(name)
    }

    /// Create the output file, appending " (1)", " (2)"... on collision
    ///
    /// Unless `overwrite` is set the file is created with `create_new`, so
    /// concurrent saves of the same name never share a path.
    async fn create_target(&self, filename: &str) -> Result<(File, PathBuf)> {
        if self.config.overwrite {
            let path = self.candidate_path(filename, 0);
            return Ok((File::create(&path).await?, path));
        }

        let mut attempt = 0;
        loop {
            let path = self.candidate_path(filename, attempt);
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((file, path)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_COLLISION_SUFFIX => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl ArtifactSink for FsSink {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    async fn save(&self, artifact: Artifact) -> Result<SavedArtifact> {
        tokio::fs::create_dir_all(&self.config.output_directory).await?;

        let filename = local_file_name(&artifact.filename);
        let (file, path) = self.create_target(&filename).await?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFF_SZ, file);
        writer.write_all(&artifact.bytes).await?;
        writer.flush().await?;

        tracing::info!(
            job_id = %artifact.job_id,
            path = %path.display(),
            bytes = artifact.bytes.len(),
            "artifact saved"
        );

        Ok(SavedArtifact {
            job_id: artifact.job_id,
            filename,
            path: Some(path),
            size_bytes: artifact.bytes.len() as u64,
            saved_at: Utc::now(),
        })
    }
}

/// Keeps artifacts in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<Vec<Artifact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, oldest first
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.artifacts
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn save(&self, artifact: Artifact) -> Result<SavedArtifact> {
        let saved = SavedArtifact {
            job_id: artifact.job_id,
            filename: artifact.filename.clone(),
            path: None,
            size_bytes: artifact.bytes.len() as u64,
            saved_at: Utc::now(),
        };
        if let Ok(mut list) = self.artifacts.lock() {
            list.push(artifact);
        }
        Ok(saved)
    }
}

/// Reduce a server-supplied name to a single path component
fn local_file_name(filename: &str) -> String {
    let last = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if last.is_empty() || last == "." || last == ".." {
        format!("{}.{}", FALLBACK_STEM, extension_for(""))
    } else {
        last.to_string()
    }
}

fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(filename: &str, bytes: &[u8]) -> Artifact {
        Artifact {
            job_id: Uuid::new_v4(),
            filename: filename.to_string(),
            content_type: "video/mp4".to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_local_file_name() {
        assert_eq!(local_file_name("clip.mp4"), "clip.mp4");
        assert_eq!(local_file_name("../../etc/passwd"), "passwd");
        assert_eq!(local_file_name("dir\\clip.mp4"), "clip.mp4");
        assert_eq!(local_file_name("a/.."), "download.bin");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("clip.mp4"), ("clip", Some("mp4")));
        assert_eq!(split_extension("clip"), ("clip", None));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
    }

    #[tokio::test]
    async fn test_fs_sink_writes_and_avoids_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsSink::in_dir(dir.path());

        let first = sink.save(artifact("clip.mp4", b"one")).await.unwrap();
        let second = sink.save(artifact("clip.mp4", b"two")).await.unwrap();

        assert_eq!(first.path.as_deref(), Some(dir.path().join("clip.mp4").as_path()));
        assert_eq!(second.path.as_deref(), Some(dir.path().join("clip (1).mp4").as_path()));
        assert_eq!(std::fs::read(dir.path().join("clip.mp4")).unwrap(), b"one");
        assert_eq!(std::fs::read(dir.path().join("clip (1).mp4")).unwrap(), b"two");
        assert_eq!(second.size_bytes, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_of_same_name_keep_both() {
        for _ in 0..50 {
            let dir = tempfile::tempdir().unwrap();
            let sink = std::sync::Arc::new(FsSink::in_dir(dir.path()));

            let a = tokio::spawn({
                let sink = sink.clone();
                async move { sink.save(artifact("clip.mp4", b"video")).await }
            });
            let b = tokio::spawn({
                let sink = sink.clone();
                async move { sink.save(artifact("clip.mp4", b"audio")).await }
            });
            let a = a.await.unwrap().unwrap();
            let b = b.await.unwrap().unwrap();

            let (path_a, path_b) = (a.path.unwrap(), b.path.unwrap());
            assert_ne!(path_a, path_b);
            assert_eq!(std::fs::read(&path_a).unwrap(), b"video");
            assert_eq!(std::fs::read(&path_b).unwrap(), b"audio");
            assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        }
    }

    #[tokio::test]
    async fn test_fs_sink_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsSink::new(SaveConfig {
            output_directory: dir.path().to_path_buf(),
            overwrite: true,
        });

        sink.save(artifact("clip.mp4", b"one")).await.unwrap();
        sink.save(artifact("clip.mp4", b"two")).await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("clip.mp4")).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.save(artifact("a.mp3", b"a")).await.unwrap();
        sink.save(artifact("b.mp3", b"b")).await.unwrap();

        let names: Vec<_> = sink.artifacts().into_iter().map(|a| a.filename).collect();
        assert_eq!(names, vec!["a.mp3", "b.mp3"]);
    }
}
