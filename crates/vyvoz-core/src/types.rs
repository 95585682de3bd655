// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport-level types shared between the channel adapters and the dialogue engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Numeric chat user identifier, the only identity the bot knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message delivered by a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Opaque transport reference to a photo (a Telegram `file_id`).
///
/// The bytes are only fetched at finalization time, via
/// [`ChannelAdapter::download_photo`](crate::traits::ChannelAdapter::download_photo).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoRef(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
    Sheets,
    Upload,
    Mail,
}

/// Callback data of the cancel button. Transports map it to
/// [`EventPayload::Cancel`]; every keyboard's cancel button carries it.
pub const CANCEL_BUTTON_DATA: &str = "cancel";

/// What the user sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// A free-text message (commands included, e.g. `/start`).
    Text(String),
    /// A photo; the largest size variant's reference.
    Photo(PhotoRef),
    /// An inline keyboard button press, carrying the button's callback data.
    Button(String),
    /// An explicit cancel request (`/cancel` or the cancel button).
    Cancel,
    /// A message kind the transport does not map (sticker, voice, location, ...).
    Unsupported(String),
}

/// An event received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub user_id: UserId,
    /// Display handle (Telegram `@username` without the `@`), when the user has one.
    pub username: Option<String>,
    pub payload: EventPayload,
    pub received_at: DateTime<Utc>,
}

/// A single inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Inline keyboard, one button per row unless built otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// Builds a keyboard with one button per row.
    pub fn single_column(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    /// Appends a row of buttons.
    pub fn with_row(mut self, row: Vec<Button>) -> Self {
        self.rows.push(row);
        self
    }

    /// Iterates every button's callback data, row by row.
    pub fn data(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(|b| b.data.as_str())
    }
}

/// Who an outbound message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// The private chat with a user.
    User(UserId),
    /// The operator/group channel configured for alerts.
    Operators,
}

/// An outbound message to be sent via a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: Recipient,
    pub text: String,
    pub keyboard: Option<Keyboard>,
    /// Sent as a photo with `text` as its caption.
    pub photo: Option<PhotoRef>,
}

impl OutboundMessage {
    pub fn text(recipient: Recipient, text: impl Into<String>) -> Self {
        Self {
            recipient,
            text: text.into(),
            keyboard: None,
            photo: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn with_photo(mut self, photo: PhotoRef) -> Self {
        self.photo = Some(photo);
        self
    }
}
