// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binary upload trait for remote file storage.

use async_trait::async_trait;

use crate::error::VyvozError;
use crate::traits::adapter::PluginAdapter;

/// Uploads request photos to cloud storage.
#[async_trait]
pub trait UploadAdapter: PluginAdapter {
    /// Stores `bytes` at `destination_path` and returns a link to the file.
    async fn upload(&self, bytes: Vec<u8>, destination_path: &str) -> Result<String, VyvozError>;
}
