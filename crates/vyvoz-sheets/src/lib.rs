// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Sheets export adapter for the Vyvoz intake bot.
//!
//! Implements [`SheetAdapter`] by appending rows to the worksheet chosen by
//! the cost-zone routing table. One call, no retries: a failed append is
//! reported by the finalizer and never repeated.

pub mod client;

use async_trait::async_trait;
use tracing::{debug, info};
use vyvoz_config::model::SheetsConfig;
use vyvoz_core::{AdapterType, HealthStatus, PluginAdapter, SheetAdapter, VyvozError};

use crate::client::SheetsClient;

/// Spreadsheet exporter implementing [`SheetAdapter`].
pub struct GoogleSheets {
    client: SheetsClient,
}

impl GoogleSheets {
    /// Builds the exporter, or `None` when export is not configured.
    pub fn from_config(config: &SheetsConfig) -> Result<Option<Self>, VyvozError> {
        let (Some(spreadsheet_id), Some(access_token)) =
            (&config.spreadsheet_id, &config.access_token)
        else {
            debug!("sheets export disabled");
            return Ok(None);
        };
        let client = SheetsClient::new(access_token, spreadsheet_id, &config.api_base)?;
        info!(spreadsheet_id = spreadsheet_id.as_str(), "sheets export initialized");
        Ok(Some(Self { client }))
    }
}

#[async_trait]
impl PluginAdapter for GoogleSheets {
    fn name(&self) -> &str {
        "google-sheets"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sheets
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
impl SheetAdapter for GoogleSheets {
    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<(), VyvozError> {
        let response = self.client.append_row(sheet, &row).await?;
        if let Some(updates) = response.updates {
            debug!(
                sheet,
                range = updates.updated_range.as_deref().unwrap_or_default(),
                rows = updates.updated_rows.unwrap_or_default(),
                "sheet updated"
            );
        }
        Ok(())
    }
}
