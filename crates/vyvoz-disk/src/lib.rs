// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Yandex Disk upload adapter for the Vyvoz intake bot.
//!
//! Implements [`UploadAdapter`]: request photos are stored on the disk and
//! the returned public link goes into the sheet row and operator alert.

pub mod client;

use async_trait::async_trait;
use tracing::{debug, info};
use vyvoz_config::model::DiskConfig;
use vyvoz_core::{AdapterType, HealthStatus, PluginAdapter, UploadAdapter, VyvozError};

use crate::client::DiskClient;

/// Photo uploader implementing [`UploadAdapter`].
pub struct YandexDisk {
    client: DiskClient,
}

impl YandexDisk {
    /// Builds the uploader, or `None` when no token is configured.
    pub fn from_config(config: &DiskConfig) -> Result<Option<Self>, VyvozError> {
        let Some(token) = &config.token else {
            debug!("disk upload disabled");
            return Ok(None);
        };
        let client = DiskClient::new(token, &config.api_base)?;
        info!(folder = config.folder.as_str(), "disk upload initialized");
        Ok(Some(Self { client }))
    }
}

#[async_trait]
impl PluginAdapter for YandexDisk {
    fn name(&self) -> &str {
        "yandex-disk"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Upload
    }

    async fn health_check(&self) -> Result<HealthStatus, VyvozError> {
        match self.client.probe().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Degraded(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), VyvozError> {
        Ok(())
    }
}

#[async_trait]
impl UploadAdapter for YandexDisk {
    async fn upload(&self, bytes: Vec<u8>, destination_path: &str) -> Result<String, VyvozError> {
        self.client.upload(bytes, destination_path).await
    }
}
