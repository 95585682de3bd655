// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update filtering and mapping into channel-agnostic [`InboundEvent`]s.
//!
//! Only private chats reach the dialogue. Every message kind maps to some
//! [`EventPayload`]; kinds the bot has no use for become
//! [`EventPayload::Unsupported`] so the active step can re-prompt.

use chrono::Utc;
use teloxide::types::{CallbackQuery, ChatKind, Message, User};
use vyvoz_core::types::{CANCEL_BUTTON_DATA, EventPayload, InboundEvent, PhotoRef};
use vyvoz_core::UserId;

/// Checks whether the message is from a private (DM) chat.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Callback queries count as private when their message is in a DM, or
/// when the message is too old for Telegram to include it.
pub fn is_dm_callback(query: &CallbackQuery) -> bool {
    query
        .message
        .as_ref()
        .is_none_or(|m| m.chat().is_private())
}

fn user_id(user: &User) -> UserId {
    UserId(user.id.0 as i64)
}

fn is_cancel_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    command == "/cancel" || command.starts_with("/cancel@")
}

/// Maps a Telegram message to the payload the dialogue consumes.
pub fn message_payload(msg: &Message) -> EventPayload {
    if let Some(text) = msg.text() {
        if is_cancel_command(text) {
            return EventPayload::Cancel;
        }
        return EventPayload::Text(text.to_string());
    }

    // Telegram lists sizes smallest first.
    if let Some(largest) = msg.photo().and_then(|sizes| sizes.last()) {
        return EventPayload::Photo(PhotoRef(largest.file.id.to_string()));
    }

    EventPayload::Unsupported(unsupported_kind(msg).to_string())
}

fn unsupported_kind(msg: &Message) -> &'static str {
    if msg.sticker().is_some() {
        "sticker"
    } else if msg.voice().is_some() {
        "voice"
    } else if msg.document().is_some() {
        "document"
    } else if msg.video().is_some() {
        "video"
    } else if msg.location().is_some() {
        "location"
    } else if msg.contact().is_some() {
        "contact"
    } else {
        "other"
    }
}

/// Maps inline button callback data to a payload.
pub fn callback_payload(data: &str) -> EventPayload {
    if data == CANCEL_BUTTON_DATA {
        EventPayload::Cancel
    } else {
        EventPayload::Button(data.to_string())
    }
}

/// Builds the event for a private-chat message. `None` without a sender.
pub fn message_event(msg: &Message) -> Option<InboundEvent> {
    let from = msg.from.as_ref()?;
    Some(InboundEvent {
        user_id: user_id(from),
        username: from.username.clone(),
        payload: message_payload(msg),
        received_at: msg.date,
    })
}

/// Builds the event for a button press. `None` when the query carries no data.
pub fn callback_event(query: &CallbackQuery) -> Option<InboundEvent> {
    let data = query.data.as_deref()?;
    Some(InboundEvent {
        user_id: user_id(&query.from),
        username: query.from.username.clone(),
        payload: callback_payload(data),
        received_at: Utc::now(),
    })
}
