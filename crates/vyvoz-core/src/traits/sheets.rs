// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document append trait for the remote spreadsheet.

use async_trait::async_trait;

use crate::error::VyvozError;
use crate::traits::adapter::PluginAdapter;

/// Best-effort row appender for the external spreadsheet.
#[async_trait]
pub trait SheetAdapter: PluginAdapter {
    /// Appends one row of cells to the end of the named worksheet.
    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<(), VyvozError>;
}
