// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the chat transport (Telegram).

use async_trait::async_trait;

use crate::error::VyvozError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundEvent, MessageId, OutboundMessage, PhotoRef};

/// Adapter for the bidirectional chat transport.
///
/// Delivers user events in per-user order and sends replies either to a
/// user's private chat or to the operator channel.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), VyvozError>;

    /// Sends a message through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, VyvozError>;

    /// Receives the next inbound event from the channel.
    async fn receive(&self) -> Result<InboundEvent, VyvozError>;

    /// Fetches the bytes behind a photo reference received earlier.
    async fn download_photo(&self, photo: &PhotoRef) -> Result<Vec<u8>, VyvozError>;
}
