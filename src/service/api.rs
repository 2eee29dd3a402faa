//! Async client for the aggregator service.
//!
//! The windowing core never talks to the network; the orchestrator spawns
//! these calls on the runtime and feeds completions back into the main loop.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::{ImageItem, Source};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("service returned HTTP {0}")]
    Status(u16),
    #[error("service rejected the request: {0}")]
    Rejected(String),
    #[error("malformed service response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to save download: {0}")]
    Io(#[from] std::io::Error),
}

/// Scrape request body: a single page, or a `{page}` URL pattern expanded
/// server-side over an inclusive page range.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ScrapeRequest {
    #[serde(rename_all = "camelCase")]
    Single { url: String },
    #[serde(rename_all = "camelCase")]
    Paged {
        url_pattern: String,
        start_page: u32,
        end_page: u32,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutcome {
    pub new_source: Source,
    #[serde(default)]
    pub new_images: Vec<ImageItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    #[serde(default)]
    pub new_images: Vec<ImageItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct FavoritePayload {
    image_id: i64,
    favorite: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Thin typed wrapper over the service's HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    pub async fn fetch_sources(&self) -> Result<Vec<Source>, ApiError> {
        let resp = self.http.get(self.endpoint("/api/sources")?).send().await?;
        expect_success(&resp)?;
        resp.json().await.map_err(ApiError::Decode)
    }

    pub async fn fetch_images(&self) -> Result<Vec<ImageItem>, ApiError> {
        let resp = self.http.get(self.endpoint("/api/images")?).send().await?;
        expect_success(&resp)?;
        resp.json().await.map_err(ApiError::Decode)
    }

    pub async fn set_favorite(&self, image_id: i64, favorite: bool) -> Result<(), ApiError> {
        let payload = FavoritePayload { image_id, favorite };
        let resp = self
            .http
            .post(self.endpoint("/api/favorites")?)
            .json(&payload)
            .send()
            .await?;
        expect_success(&resp)
    }

    /// Registers a new source and scrapes it. The service responds with the
    /// source record plus the images it found.
    pub async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeOutcome, ApiError> {
        let resp = self
            .http
            .post(self.endpoint("/api/images/scrape")?)
            .json(request)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            return Err(match message {
                Some(message) => ApiError::Rejected(message),
                None => ApiError::Status(status),
            });
        }
        resp.json().await.map_err(ApiError::Decode)
    }

    pub async fn remove_source(&self, source_id: i64) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.endpoint(&format!("/api/sources/{source_id}"))?)
            .send()
            .await?;
        expect_success(&resp)
    }

    pub async fn sync_source(&self, source_id: i64) -> Result<SyncOutcome, ApiError> {
        let resp = self
            .http
            .post(self.endpoint(&format!("/api/sources/{source_id}/sync"))?)
            .send()
            .await?;
        expect_success(&resp)?;
        resp.json().await.map_err(ApiError::Decode)
    }

    /// Fetches an image through the service's download proxy and writes it
    /// into `target_dir`, named after the final URL path segment.
    pub async fn download(&self, image_src: &str, target_dir: &Path) -> Result<PathBuf, ApiError> {
        let mut url = self.endpoint("/api/download")?;
        url.query_pairs_mut().append_pair("url", image_src);

        let resp = self.http.get(url).send().await?;
        expect_success(&resp)?;
        let bytes = resp.bytes().await?;

        let path = target_dir.join(file_name_for(image_src));
        tokio::fs::write(&path, &bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "Saved download");
        Ok(path)
    }
}

fn expect_success(resp: &reqwest::Response) -> Result<(), ApiError> {
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(ApiError::Status(resp.status().as_u16()))
    }
}

/// Download file name derived from the image URL; falls back to a generic
/// name for unparseable or path-less URLs.
fn file_name_for(image_src: &str) -> String {
    Url::parse(image_src)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(str::to_owned)
        })
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
        .unwrap_or_else(|| "image".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_for() {
        assert_eq!(
            file_name_for("https://cdn.example.com/photos/cat.jpg"),
            "cat.jpg"
        );
        assert_eq!(file_name_for("https://cdn.example.com/"), "image");
        assert_eq!(file_name_for("not a url"), "image");
    }

    #[test]
    fn test_scrape_request_wire_shape() {
        let single = ScrapeRequest::Single {
            url: "https://example.com/gallery".into(),
        };
        assert_eq!(
            serde_json::to_value(&single).unwrap(),
            serde_json::json!({"url": "https://example.com/gallery"})
        );

        let paged = ScrapeRequest::Paged {
            url_pattern: "https://example.com/page/{page}".into(),
            start_page: 1,
            end_page: 10,
        };
        assert_eq!(
            serde_json::to_value(&paged).unwrap(),
            serde_json::json!({
                "urlPattern": "https://example.com/page/{page}",
                "startPage": 1,
                "endPage": 10
            })
        );
    }
}
