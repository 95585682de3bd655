// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outgoing mail trait.

use async_trait::async_trait;

use crate::error::VyvozError;
use crate::traits::adapter::PluginAdapter;

/// Sends plain-text notification mail.
#[async_trait]
pub trait MailAdapter: PluginAdapter {
    async fn send(&self, body: &str, recipient: &str) -> Result<(), VyvozError>;
}
