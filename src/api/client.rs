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


//! HTTP client for the extraction service
//!
//! Two calls matter: `POST /process` resolves a URL into [`Metadata`], and
//! `POST /download` opens the byte stream of one variant. The client never
//! buffers a download itself; it hands the response head and a lazy chunk
//! stream to the download controller.
//!
//! Non-2xx answers carry `{ "error": "..." }`; that message is preserved so
//! the channel banner can show it verbatim.

use crate::api::models::{DownloadRequest, ErrorBody, HealthResponse, Metadata, ResolveRequest, ResolveResponse};
use crate::config::ClientConfig;
use crate::error::{ClipFetchError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use url::Url;

/// Content type assumed when the download response does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Lazy, finite, non-restartable sequence of body chunks
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

/// Transport metadata of a successful download response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    /// HTTP status
    pub status: u16,
    /// Declared body length, if any
    pub content_length: Option<u64>,
    /// Declared content type, or [`DEFAULT_CONTENT_TYPE`]
    pub content_type: String,
    /// Raw `Content-Disposition` header value
    pub content_disposition: Option<String>,
}

impl ResponseHead {
    /// Head with nothing declared beyond the status
    pub fn bare(status: u16) -> Self {
        Self {
            status,
            content_length: None,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            content_disposition: None,
        }
    }

    fn from_headers(status: StatusCode, headers: &HeaderMap, size_hint: Option<u64>) -> Self {
        let header_str = |name: HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

        let content_length = header_str(CONTENT_LENGTH)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .or(size_hint);
        let content_type = header_str(CONTENT_TYPE)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let content_disposition = header_str(CONTENT_DISPOSITION).map(str::to_string);

        Self {
            status: status.as_u16(),
            content_length,
            content_type,
            content_disposition,
        }
    }
}

/// An opened download: response head plus the body still on the wire
pub struct DownloadResponse {
    pub head: ResponseHead,
    pub body: ChunkStream,
}

impl std::fmt::Debug for DownloadResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadResponse").field("head", &self.head).finish_non_exhaustive()
    }
}

/// HTTP client for the extraction service
///
/// Cheap to share behind an `Arc`; both channels use the same instance.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    /// Underlying HTTP client
    client: Client,
    /// Base URL, always ending in '/'
    base_url: Url,
    /// Client configuration
    config: ClientConfig,
}

impl ServiceClient {
    /// Create a client for the default local service
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let base_url = config.parsed_base_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ClipFetchError::InvalidConfiguration(format!("Invalid user agent: {}", e)))?,
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Get the service base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Resolve a media URL into metadata
    ///
    /// Issues exactly one request. The caller is expected to have trimmed
    /// and validated `media_url`.
    ///
    /// # Errors
    /// `Resolution` for any failure, carrying the server message when present
    pub async fn resolve(&self, media_url: &str) -> Result<Metadata> {
        let endpoint = self.endpoint("process")?;
        tracing::debug!(%endpoint, media_url, "resolving media url");

        let response = self
            .client
            .post(endpoint)
            .header(ACCEPT, "application/json")
            .json(&ResolveRequest {
                url: media_url.to_string(),
            })
            .send()
            .await
            .map_err(|e| ClipFetchError::from(e).into_resolution())?;

        let status = response.status();
        if !status.is_success() {
            let message = read_error_message(response).await;
            tracing::warn!(status = status.as_u16(), message = ?message, "resolution rejected");
            return Err(ClipFetchError::resolution(message, Some(status.as_u16())));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ClipFetchError::from(e).into_resolution())?;

        // Some failures arrive as 2xx with an error field
        if let Ok(ErrorBody { error: Some(message) }) = serde_json::from_str::<ErrorBody>(&text) {
            return Err(ClipFetchError::resolution(Some(message), Some(status.as_u16())));
        }

        match serde_json::from_str::<ResolveResponse>(&text) {
            Ok(parsed) => Ok(Metadata::from(parsed)),
            Err(e) => {
                tracing::warn!(error = %e, "resolution body could not be parsed");
                Err(ClipFetchError::resolution(None, Some(status.as_u16())))
            }
        }
    }

    /// Open the byte stream for one variant
    ///
    /// Returns once the response headers are in; the body is consumed by
    /// the caller chunk by chunk.
    ///
    /// # Errors
    /// `Transfer` on network failure or non-2xx status
    pub async fn open_download(&self, request: &DownloadRequest) -> Result<DownloadResponse> {
        let endpoint = self.endpoint("download")?;
        tracing::debug!(
            %endpoint,
            format_id = %request.format_id,
            mode = %request.mode,
            output_format = %request.output_format,
            "requesting download"
        );

        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ClipFetchError::from(e).into_transfer())?;

        let status = response.status();
        if !status.is_success() {
            let message = read_error_message(response).await;
            tracing::warn!(status = status.as_u16(), message = ?message, "download rejected");
            return Err(ClipFetchError::transfer(message, Some(status.as_u16())));
        }

        let head = ResponseHead::from_headers(status, response.headers(), response.content_length());
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ClipFetchError::from(e).into_transfer()))
            .boxed();

        Ok(DownloadResponse { head, body })
    }

    /// Ping the service
    pub async fn health(&self) -> Result<HealthResponse> {
        let endpoint = self.endpoint("health")?;
        let response = self.client.get(endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = read_error_message(response).await;
            return Err(ClipFetchError::InvalidConfiguration(format!(
                "Service unhealthy ({}): {}",
                status.as_u16(),
                message.unwrap_or_else(|| "no details".to_string())
            )));
        }
        Ok(response.json::<HealthResponse>().await?)
    }
}

/// The two service calls a channel needs
///
/// Implemented by [`ServiceClient`]; channels hold it as a trait object so
/// hosts can route requests elsewhere.
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Resolve a media URL into metadata (one request)
    async fn resolve(&self, media_url: &str) -> Result<Metadata>;

    /// Open the byte stream for one variant
    async fn open_download(&self, request: &DownloadRequest) -> Result<DownloadResponse>;
}

#[async_trait]
impl MediaService for ServiceClient {
    async fn resolve(&self, media_url: &str) -> Result<Metadata> {
        ServiceClient::resolve(self, media_url).await
    }

    async fn open_download(&self, request: &DownloadRequest) -> Result<DownloadResponse> {
        ServiceClient::open_download(self, request).await
    }
}

/// Pull `error` out of a failure body, if the body is JSON and has one
async fn read_error_message(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.error)
        .filter(|m| !m.trim().is_empty())
}
