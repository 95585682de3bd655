// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Yandex Disk REST API.
//!
//! An upload is four calls: request an upload link, `PUT` the bytes to it,
//! publish the stored file, then read back its permanent public link.

use std::time::Duration;

use reqwest::Url;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;
use vyvoz_core::VyvozError;

/// Base URL of the Disk REST API.
pub const API_BASE_URL: &str = "https://cloud-api.yandex.net";

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

#[derive(Debug, Deserialize)]
struct PublicResource {
    #[serde(default)]
    public_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone)]
pub struct DiskClient {
    client: reqwest::Client,
    base_url: Url,
}

impl DiskClient {
    pub fn new(token: &str, api_base: &str) -> Result<Self, VyvozError> {
        let mut auth = HeaderValue::from_str(&format!("OAuth {token}"))
            .map_err(|e| VyvozError::Config(format!("invalid disk token: {e}")))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| disk_error("failed to build HTTP client", e))?;

        let base_url = Url::parse(api_base)
            .map_err(|e| VyvozError::Config(format!("invalid disk.api_base {api_base}: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// `{base}/v1/disk/resources/{action}?path=...`; an empty action
    /// addresses the resource metadata itself.
    fn resource_url(&self, action: &str, path: &str) -> Result<Url, VyvozError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| VyvozError::Config("disk.api_base cannot be a base URL".into()))?;
            segments.pop_if_empty().extend(["v1", "disk", "resources"]);
            if !action.is_empty() {
                segments.push(action);
            }
        }
        url.query_pairs_mut().append_pair("path", path);
        Ok(url)
    }

    /// Sends an API request and returns the body of a successful response.
    async fn call(&self, request: reqwest::RequestBuilder) -> Result<String, VyvozError> {
        let response = request
            .send()
            .await
            .map_err(|e| disk_error("HTTP request failed", e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| disk_error("failed to read response body", e))?;
        if !status.is_success() {
            return Err(VyvozError::sink("disk", api_error_message(status, &body)));
        }
        Ok(body)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, VyvozError> {
        let body = self.call(self.client.get(url)).await?;
        serde_json::from_str(&body).map_err(|e| VyvozError::Sink {
            sink: "disk".into(),
            message: format!("unexpected API response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Stores `bytes` at `path` (overwriting), publishes the file and returns
    /// its public link, which does not expire.
    pub async fn upload(&self, bytes: Vec<u8>, path: &str) -> Result<String, VyvozError> {
        let path = absolute(path);

        let mut upload_url = self.resource_url("upload", &path)?;
        upload_url.query_pairs_mut().append_pair("overwrite", "true");
        let Link { href } = self.get_json(upload_url).await?;
        debug!(path = path.as_str(), "upload link obtained");

        let size = bytes.len();
        let response = self
            .client
            .put(&href)
            .body(bytes)
            .send()
            .await
            .map_err(|e| disk_error("upload failed", e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VyvozError::sink(
                "disk",
                format!("upload returned {status}: {body}"),
            ));
        }
        debug!(path = path.as_str(), size, "file uploaded");

        self.call(self.client.put(self.resource_url("publish", &path)?))
            .await?;

        let mut meta_url = self.resource_url("", &path)?;
        meta_url.query_pairs_mut().append_pair("fields", "public_url");
        let resource: PublicResource = self.get_json(meta_url).await?;
        resource.public_url.ok_or_else(|| {
            VyvozError::sink("disk", format!("published {path} has no public_url"))
        })
    }

    /// Reads disk metadata, to verify the token.
    pub async fn probe(&self) -> Result<(), VyvozError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| VyvozError::Config("disk.api_base cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(["v1", "disk"]);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| disk_error("HTTP request failed", e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(VyvozError::sink("disk", api_error_message(status, &body)))
    }
}

/// Disk paths are rooted; `folder/a.jpg` becomes `/folder/a.jpg`.
fn absolute(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) if !err.error.is_empty() => {
            format!("Disk API error {status} ({}): {}", err.error, err.description)
        }
        _ => format!("Disk API returned {status}: {body}"),
    }
}

fn disk_error(context: &str, e: reqwest::Error) -> VyvozError {
    VyvozError::Sink {
        sink: "disk".into(),
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}
