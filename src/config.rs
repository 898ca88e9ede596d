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


//! Client, UI timing and save configuration
//!
//! All settings have working defaults; `ClientConfig::builder()` customizes
//! the service connection in the same builder style used for the HTTP client.

use crate::error::{ClipFetchError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default service location (the service's own development address)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

/// Connect timeout in seconds, always applied
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Configuration for ServiceClient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the extraction service
    pub base_url: String,
    /// Whole-request timeout. `None` lets a download run as long as it streams.
    pub timeout: Option<Duration>,
    /// Timeout for establishing a connection
    pub connect_timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: format!("clipfetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Parse the base URL, making sure it ends with a slash so endpoint
    /// paths join under it instead of replacing its last segment
    pub fn parsed_base_url(&self) -> Result<Url> {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty() {
            return Err(ClipFetchError::InvalidConfiguration("base URL is empty".to_string()));
        }
        let mut url = Url::parse(trimmed)?;
        if url.cannot_be_a_base() {
            return Err(ClipFetchError::InvalidConfiguration(format!(
                "base URL cannot have paths: {}",
                trimmed
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

/// Builder for ClientConfig
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed display intervals of the channel UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiTimings {
    /// How long "complete" stays on screen before the trigger is re-enabled
    pub complete_display: Duration,
    /// Further delay before the progress surface collapses
    pub collapse_delay: Duration,
    /// Lifetime of an error banner
    pub banner_duration: Duration,
}

impl Default for UiTimings {
    fn default() -> Self {
        Self {
            complete_display: Duration::from_secs(2),
            collapse_delay: Duration::from_millis(500),
            banner_duration: Duration::from_secs(5),
        }
    }
}

impl UiTimings {
    /// Zero-length intervals, for headless runs
    pub fn immediate() -> Self {
        Self {
            complete_display: Duration::ZERO,
            collapse_delay: Duration::ZERO,
            banner_duration: Duration::from_secs(5),
        }
    }
}

/// Where finished artifacts are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveConfig {
    /// Output directory for downloaded files
    pub output_directory: PathBuf,
    /// Replace an existing file instead of picking a "name (1).ext" variant
    pub overwrite: bool,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("."),
            overwrite: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::builder()
            .base_url("http://media.local:8080")
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("TestAgent/1.0")
            .build();

        assert_eq!(config.base_url, "http://media.local:8080");
        assert_eq!(config.timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "TestAgent/1.0");
    }

    #[test]
    fn test_default_has_no_request_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_parsed_base_url_gets_trailing_slash() {
        let config = ClientConfig::builder().base_url("http://host/api").build();
        let url = config.parsed_base_url().unwrap();
        assert_eq!(url.join("process").unwrap().as_str(), "http://host/api/process");
    }

    #[test]
    fn test_parsed_base_url_rejects_garbage() {
        let config = ClientConfig::builder().base_url("   ").build();
        assert!(matches!(
            config.parsed_base_url(),
            Err(ClipFetchError::InvalidConfiguration(_))
        ));

        let config = ClientConfig::builder().base_url("not a url").build();
        assert!(matches!(config.parsed_base_url(), Err(ClipFetchError::UrlError(_))));
    }
}
