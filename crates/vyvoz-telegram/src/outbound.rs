// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of outbound replies into Bot API request parts.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use vyvoz_core::types::Keyboard;

/// Bot API limit on photo captions, in characters.
pub const CAPTION_LIMIT: usize = 1024;

/// Bot API limit on message text, in characters.
pub const MESSAGE_LIMIT: usize = 4096;

/// Builds an inline keyboard of callback buttons, preserving rows.
pub fn to_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.data.clone()))
            .collect::<Vec<_>>()
    }))
}

/// Whether `text` can ride along as a photo caption.
pub fn fits_caption(text: &str) -> bool {
    text.chars().count() <= CAPTION_LIMIT
}

/// Cuts `text` to the message limit on a character boundary.
pub fn clamp_text(text: &str) -> &str {
    match text.char_indices().nth(MESSAGE_LIMIT) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
